//! Audience filter applied when selecting prompts for a turn.

use serde::{Deserialize, Serialize};

use crate::{Gender, Item};

/// Who is playing the turn and who it is aimed at.
///
/// Every field is optional; an unset field does not filter anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudienceFilter {
    pub player_gender: Option<Gender>,
    pub partner_gender: Option<Gender>,
    /// Items must carry every one of these tags
    #[serde(default)]
    pub required_tags: Vec<String>,
}

impl AudienceFilter {
    pub fn new(player_gender: Option<Gender>, partner_gender: Option<Gender>) -> Self {
        Self {
            player_gender,
            partner_gender,
            required_tags: Vec::new(),
        }
    }

    pub fn with_required_tag(mut self, tag: impl Into<String>) -> Self {
        self.required_tags.push(tag.into());
        self
    }

    pub fn matches(&self, item: &Item) -> bool {
        self.player_gender.map_or(true, |g| item.is_for(g))
            && self.partner_gender.map_or(true, |g| item.can_target(g))
            && self.required_tags.iter().all(|tag| item.has_tag(tag))
    }
}
