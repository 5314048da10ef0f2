//! Error types for port operations.

use truthdare_domain::{ChallengeKind, Level};

/// Item source failures with context for debugging.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    /// A query against the store failed - includes what was being fetched.
    #[error("Item query failed for {level} {kind}: {message}")]
    Query {
        level: Level,
        kind: ChallengeKind,
        message: String,
    },
}

impl SourceError {
    pub fn query(level: Level, kind: ChallengeKind, message: impl ToString) -> Self {
        Self::Query {
            level,
            kind,
            message: message.to_string(),
        }
    }
}
