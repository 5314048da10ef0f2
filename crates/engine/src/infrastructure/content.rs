//! Content deck loading.
//!
//! A deck is a JSON document `{ "items": [ ... ] }` in the content store's
//! item shape (see [`truthdare_domain::Item`]).

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use truthdare_domain::{ChallengeKind, DomainError, Item, Level};

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Failed to read deck {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed deck: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid item: {0}")]
    Invalid(#[from] DomainError),
}

#[derive(Debug, Deserialize)]
struct Deck {
    items: Vec<Item>,
}

/// Read and validate a deck file.
pub fn load_deck(path: &Path) -> Result<Vec<Item>, ContentError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let items = parse_deck(&raw)?;
    tracing::info!(path = %path.display(), items = items.len(), "Loaded content deck");
    Ok(items)
}

/// Parse a deck, rejecting blank items and duplicate ids.
pub fn parse_deck(raw: &str) -> Result<Vec<Item>, ContentError> {
    let deck: Deck = serde_json::from_str(raw)?;
    let mut seen = HashSet::new();
    for item in &deck.items {
        item.validate()?;
        if !seen.insert(item.id().clone()) {
            return Err(DomainError::constraint(format!("duplicate item id {}", item.id())).into());
        }
    }
    Ok(deck.items)
}

/// Small deck shipped with the binary so it runs without a content file.
pub fn builtin_deck() -> Vec<Item> {
    use ChallengeKind::{Dare, Truth};

    let entries: &[(&str, Level, ChallengeKind, &str)] = &[
        ("soft-truth-1", Level::Soft, Truth, "What was your most embarrassing moment at school?"),
        ("soft-truth-2", Level::Soft, Truth, "What is the silliest thing you are afraid of?"),
        ("soft-truth-3", Level::Soft, Truth, "Which song do you secretly know all the words to?"),
        ("soft-dare-1", Level::Soft, Dare, "Do your best impression of your partner."),
        ("soft-dare-2", Level::Soft, Dare, "Speak in an accent until your next turn."),
        ("soft-dare-3", Level::Soft, Dare, "Show the last photo you took."),
        ("mild-truth-1", Level::Mild, Truth, "What was your first impression of your partner?"),
        ("mild-truth-2", Level::Mild, Truth, "What is the most romantic thing you have done?"),
        ("mild-dare-1", Level::Mild, Dare, "Give your partner a shoulder massage for a minute."),
        ("mild-dare-2", Level::Mild, Dare, "Slow dance with your partner without music."),
        ("hot-truth-1", Level::Hot, Truth, "Where is the most unusual place you have kissed someone?"),
        ("hot-dare-1", Level::Hot, Dare, "Whisper something flirty in your partner's ear."),
        ("spicy-truth-1", Level::Spicy, Truth, "What is a fantasy you have never told anyone?"),
        ("spicy-dare-1", Level::Spicy, Dare, "Let your partner choose your next outfit."),
        ("kinky-truth-1", Level::Kinky, Truth, "What is one boundary you would like to explore?"),
    ];

    entries
        .iter()
        .map(|(id, level, kind, text)| Item::new(*id, *level, *kind, *text))
        .collect()
}
