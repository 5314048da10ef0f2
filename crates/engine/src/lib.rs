//! Truth-or-Dare engine library.
//!
//! ## Structure
//!
//! - `use_cases/` - Challenge pair scheduling and game sessions
//! - `infrastructure/` - Ports and their adapters (item sources, randomness,
//!   content decks, loading indicator)
//! - `config` - Environment configuration
//! - `app` - Application composition

pub mod app;
pub mod config;
pub mod infrastructure;
pub mod use_cases;

/// Shared fakes and item builders for unit tests.
#[cfg(test)]
pub mod test_fixtures;

pub use app::App;
pub use config::{ConfigError, EngineConfig};
pub use use_cases::{
    ChallengePairScheduler, GameError, GameSession, GameSettings, SchedulerConfig, SchedulerError,
    SchedulerSnapshot, SessionSnapshot, TurnOutcome,
};
