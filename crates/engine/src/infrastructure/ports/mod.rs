//! Port traits for infrastructure boundaries.
//!
//! Ports exist for:
//! - The content store (in-memory pool today, remote random-pick service later)
//! - Randomness (for testing)

mod error;
mod external;
mod testing;

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{ItemQuery, ItemSource};

#[cfg(test)]
pub use external::MockItemSource;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::RandomPort;

#[cfg(test)]
pub use testing::MockRandomPort;

// =============================================================================
// Error Types
// =============================================================================
pub use error::SourceError;
