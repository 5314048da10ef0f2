//! Item entity - a single truth or dare prompt
//!
//! Items are read from the content store and never mutated afterwards.
//! Whoever holds one (a pair slot, the level cache) owns its own clone.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;
use crate::value_objects::Level;
use crate::ItemId;

/// Whether a prompt asks a question or asks for an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    Truth,
    Dare,
}

impl ChallengeKind {
    pub fn all() -> &'static [ChallengeKind] {
        &[ChallengeKind::Truth, ChallengeKind::Dare]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeKind::Truth => "truth",
            ChallengeKind::Dare => "dare",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ChallengeKind::Truth => "Truth",
            ChallengeKind::Dare => "Dare",
        }
    }
}

impl fmt::Display for ChallengeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for ChallengeKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "truth" => Ok(ChallengeKind::Truth),
            "dare" => Ok(ChallengeKind::Dare),
            _ => Err(DomainError::parse(format!("Unknown challenge kind: {}", s))),
        }
    }
}

/// Gender used for audience filtering of prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    NonBinary,
}

impl std::str::FromStr for Gender {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "non_binary" | "nonbinary" => Ok(Gender::NonBinary),
            _ => Err(DomainError::parse(format!("Unknown gender: {}", s))),
        }
    }
}

/// A challenge prompt.
///
/// Empty gender lists mean "anyone": an item with no `genders` can be given
/// to every player, one with no `target_genders` can target every partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    id: ItemId,
    level: Level,
    kind: ChallengeKind,
    text: String,
    /// Genders of the player allowed to receive this prompt
    #[serde(default)]
    genders: Vec<Gender>,
    /// Genders of the partner this prompt may be aimed at
    #[serde(default)]
    target_genders: Vec<Gender>,
    /// Free-form tags for filtering
    #[serde(default)]
    tags: Vec<String>,
}

impl Item {
    pub fn new(
        id: impl Into<ItemId>,
        level: Level,
        kind: ChallengeKind,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            level,
            kind,
            text: text.into(),
            genders: Vec::new(),
            target_genders: Vec::new(),
            tags: Vec::new(),
        }
    }

    // === Accessors ===

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn kind(&self) -> ChallengeKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn genders(&self) -> &[Gender] {
        &self.genders
    }

    pub fn target_genders(&self) -> &[Gender] {
        &self.target_genders
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    // === Builder Methods ===

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.genders.push(gender);
        self
    }

    pub fn with_target_gender(mut self, gender: Gender) -> Self {
        self.target_genders.push(gender);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    // === Queries ===

    /// Whether a player of `gender` may receive this prompt.
    pub fn is_for(&self, gender: Gender) -> bool {
        self.genders.is_empty() || self.genders.contains(&gender)
    }

    /// Whether this prompt may be aimed at a partner of `gender`.
    pub fn can_target(&self, gender: Gender) -> bool {
        self.target_genders.is_empty() || self.target_genders.contains(&gender)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Check the invariants content loaders rely on.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.id.as_str().trim().is_empty() {
            return Err(DomainError::invalid_id("item id cannot be empty"));
        }
        if self.text.trim().is_empty() {
            return Err(DomainError::validation(format!(
                "Item {} has empty text",
                self.id
            )));
        }
        Ok(())
    }
}
