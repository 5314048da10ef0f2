extern crate self as truthdare_domain;

pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;

pub use entities::{ChallengeKind, Gender, Item, Player};

pub use error::DomainError;

// Re-export ID types
pub use ids::{ItemId, PlayerId, SessionId};

// Re-export value objects (explicit list in value_objects/mod.rs)
pub use value_objects::{AudienceFilter, ChallengePair, Level, UsedItems};
