//! Player entity - one of the two people taking turns

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::{Gender, PlayerId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub gender: Option<Gender>,
}

impl Player {
    pub fn new(name: impl Into<String>, gender: Option<Gender>) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("Player name cannot be empty"));
        }
        Ok(Self {
            id: PlayerId::new(),
            name,
            gender,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_name() {
        assert!(Player::new(" ", None).is_err());
        assert!(Player::new("Sam", Some(Gender::NonBinary)).is_ok());
    }
}
