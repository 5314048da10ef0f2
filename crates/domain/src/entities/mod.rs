//! Domain entities - Core business objects with identity

mod item;
mod player;

pub use item::{ChallengeKind, Gender, Item};
pub use player::Player;
