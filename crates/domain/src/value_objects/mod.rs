//! Value objects - Immutable objects defined by their attributes

mod audience;
mod challenge_pair;
mod level;
mod used_items;

pub use audience::AudienceFilter;
pub use challenge_pair::ChallengePair;
pub use level::Level;
pub use used_items::UsedItems;
