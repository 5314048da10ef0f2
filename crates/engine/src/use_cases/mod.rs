//! Use cases - User story orchestration.
//!
//! Each module contains use cases for a specific domain area.

pub mod challenge_pair;
pub mod game;

// Re-export main types
pub use challenge_pair::{ChallengePairScheduler, SchedulerConfig, SchedulerError, SchedulerSnapshot};
pub use game::{GameError, GameSession, GameSettings, SessionSnapshot, TurnOutcome};
