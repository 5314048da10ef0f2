//! Intensity levels
//!
//! Levels are ordered from tamest to most explicit. Progressive mode walks
//! them in order with [`Level::next`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    #[default]
    Soft,
    Mild,
    Hot,
    Spicy,
    Kinky,
}

impl Level {
    /// Get all levels in ascending intensity
    pub fn all() -> &'static [Level] {
        &[
            Level::Soft,
            Level::Mild,
            Level::Hot,
            Level::Spicy,
            Level::Kinky,
        ]
    }

    /// Wire name, as used in content files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Soft => "soft",
            Level::Mild => "mild",
            Level::Hot => "hot",
            Level::Spicy => "spicy",
            Level::Kinky => "kinky",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Level::Soft => "Soft",
            Level::Mild => "Mild",
            Level::Hot => "Hot",
            Level::Spicy => "Spicy",
            Level::Kinky => "Kinky",
        }
    }

    /// Next level up, `None` at the top.
    pub fn next(&self) -> Option<Level> {
        match self {
            Level::Soft => Some(Level::Mild),
            Level::Mild => Some(Level::Hot),
            Level::Hot => Some(Level::Spicy),
            Level::Spicy => Some(Level::Kinky),
            Level::Kinky => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for Level {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "soft" => Ok(Level::Soft),
            "mild" => Ok(Level::Mild),
            "hot" => Ok(Level::Hot),
            "spicy" => Ok(Level::Spicy),
            "kinky" => Ok(Level::Kinky),
            _ => Err(DomainError::parse(format!("Unknown level: {}", s))),
        }
    }
}
