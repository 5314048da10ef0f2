//! Testability port for injecting randomness.

// =============================================================================
// Testability Ports
// =============================================================================

#[cfg_attr(test, mockall::automock)]
pub trait RandomPort: Send + Sync {
    /// Uniform index in `0..len`. Callers never pass zero.
    fn pick_index(&self, len: usize) -> usize;
}
