//! The truth/dare pair offered to a player on a turn.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{ChallengeKind, Item, ItemId};

/// One optional truth and one optional dare.
///
/// Slots are filled independently: a level with truths but no dares
/// yields a pair with only `truth` set, and that pair is still playable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengePair {
    pub truth: Option<Item>,
    pub dare: Option<Item>,
}

impl ChallengePair {
    pub fn new(truth: Option<Item>, dare: Option<Item>) -> Self {
        Self { truth, dare }
    }

    /// The pair with both slots empty.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Both slots empty.
    pub fn is_empty(&self) -> bool {
        self.truth.is_none() && self.dare.is_none()
    }

    /// Both slots populated.
    pub fn is_complete(&self) -> bool {
        self.truth.is_some() && self.dare.is_some()
    }

    pub fn get(&self, kind: ChallengeKind) -> Option<&Item> {
        match kind {
            ChallengeKind::Truth => self.truth.as_ref(),
            ChallengeKind::Dare => self.dare.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, kind: ChallengeKind) -> &mut Option<Item> {
        match kind {
            ChallengeKind::Truth => &mut self.truth,
            ChallengeKind::Dare => &mut self.dare,
        }
    }

    /// Populated slots, truth first.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.truth.iter().chain(self.dare.iter())
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.items().any(|item| item.id() == id)
    }

    /// Empty the slot holding `id`, leaving the sibling slot untouched.
    ///
    /// Returns the kind of the slot that was cleared, if any matched.
    pub fn remove(&mut self, id: &ItemId) -> Option<ChallengeKind> {
        for kind in ChallengeKind::all() {
            let slot = self.slot_mut(*kind);
            if slot.as_ref().is_some_and(|item| item.id() == id) {
                *slot = None;
                return Some(*kind);
            }
        }
        None
    }

    /// Copy of this pair with every slot whose id is in `excluded` emptied.
    pub fn without(&self, excluded: &HashSet<ItemId>) -> Self {
        let keep = |slot: &Option<Item>| slot.clone().filter(|item| !excluded.contains(item.id()));
        Self {
            truth: keep(&self.truth),
            dare: keep(&self.dare),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Level;

    fn truth(id: &str) -> Item {
        Item::new(id, Level::Soft, ChallengeKind::Truth, "truth text")
    }

    fn dare(id: &str) -> Item {
        Item::new(id, Level::Soft, ChallengeKind::Dare, "dare text")
    }

    #[test]
    fn partial_pair_is_neither_empty_nor_complete() {
        let pair = ChallengePair::new(Some(truth("t1")), None);
        assert!(!pair.is_empty());
        assert!(!pair.is_complete());
        assert!(ChallengePair::empty().is_empty());
    }

    #[test]
    fn remove_clears_only_the_matching_slot() {
        let mut pair = ChallengePair::new(Some(truth("t1")), Some(dare("d1")));
        assert_eq!(pair.remove(&ItemId::new("t1")), Some(ChallengeKind::Truth));
        assert!(pair.truth.is_none());
        assert_eq!(pair.dare.as_ref().map(|d| d.id().as_str()), Some("d1"));
        assert_eq!(pair.remove(&ItemId::new("missing")), None);
    }

    #[test]
    fn without_drops_excluded_ids() {
        let pair = ChallengePair::new(Some(truth("t1")), Some(dare("d1")));
        let excluded: HashSet<ItemId> = [ItemId::new("d1")].into_iter().collect();
        let filtered = pair.without(&excluded);
        assert!(filtered.contains(&ItemId::new("t1")));
        assert!(filtered.dare.is_none());
    }

    #[test]
    fn serializes_empty_slots_as_null() {
        let json = serde_json::to_value(ChallengePair::empty()).unwrap();
        assert_eq!(json, serde_json::json!({ "truth": null, "dare": null }));
    }
}
