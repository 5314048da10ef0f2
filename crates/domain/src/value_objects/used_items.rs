//! Record of prompts already played.
//!
//! The game layer decides how to key the record (per player, per level,
//! per session...). The scheduler only ever needs the flattened id set.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::ItemId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsedItems(HashMap<String, HashSet<ItemId>>);

impl UsedItems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, id: ItemId) -> bool {
        self.0.entry(key.into()).or_default().insert(id)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.0.values().any(|ids| ids.contains(id))
    }

    pub fn ids_for(&self, key: &str) -> Option<&HashSet<ItemId>> {
        self.0.get(key)
    }

    /// Every id under every key.
    pub fn all_ids(&self) -> HashSet<ItemId> {
        self.0.values().flatten().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.0.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(HashSet::is_empty)
    }
}

impl From<HashMap<String, HashSet<ItemId>>> for UsedItems {
    fn from(value: HashMap<String, HashSet<ItemId>>) -> Self {
        Self(value)
    }
}
