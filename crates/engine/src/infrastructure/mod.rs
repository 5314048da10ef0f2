//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod content;
pub mod loading;
pub mod pool_source;
pub mod ports;
pub mod random;
