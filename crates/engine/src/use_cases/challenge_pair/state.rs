//! Scheduler state record.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use truthdare_domain::{ChallengePair, Item, ItemId, Level, UsedItems};

pub(super) struct SchedulerState {
    pub level: Level,
    pub pool: Arc<[Item]>,
    pub used_items: UsedItems,
    pub excluded_ids: HashSet<ItemId>,
    /// Ids consumed through `mark_item_as_used` since the last initialize
    pub consumed: HashSet<ItemId>,
    pub current: ChallengePair,
    pub next: ChallengePair,
    /// Last pair fetched for each level
    pub level_cache: HashMap<Level, ChallengePair>,
    pub exhausted: bool,
    pub error: Option<String>,
    /// A prefetch of `next` is in flight
    pub prefetching: bool,
    /// Bumped by initialize, reset and change_level
    pub generation: u64,
    /// Bumped whenever `next` is rewritten outside of a prefetch
    pub next_epoch: u64,
}

impl SchedulerState {
    pub fn new() -> Self {
        Self {
            level: Level::default(),
            pool: Arc::from(Vec::new()),
            used_items: UsedItems::new(),
            excluded_ids: HashSet::new(),
            consumed: HashSet::new(),
            current: ChallengePair::empty(),
            next: ChallengePair::empty(),
            level_cache: HashMap::new(),
            exhausted: false,
            error: None,
            prefetching: false,
            generation: 0,
            next_epoch: 0,
        }
    }

    /// Blank state that still invalidates everything handed out before it.
    pub fn succeeding(previous: &SchedulerState) -> Self {
        Self {
            generation: previous.generation + 1,
            next_epoch: previous.next_epoch + 1,
            ..Self::new()
        }
    }

    /// Ids played in this game: the caller's record plus ids consumed here.
    pub fn used_ids(&self) -> HashSet<ItemId> {
        let mut ids = self.used_items.all_ids();
        ids.extend(self.consumed.iter().cloned());
        ids
    }

    /// Everything that must never be offered.
    pub fn exclusions(&self) -> HashSet<ItemId> {
        let mut ids = self.used_ids();
        ids.extend(self.excluded_ids.iter().cloned());
        ids
    }

    /// Drop any in-flight prefetch result and allow a new prefetch.
    pub fn invalidate_next(&mut self) {
        self.next_epoch += 1;
        self.prefetching = false;
    }

    /// Store into `current`, dropping anything excluded since the fetch began.
    pub fn store_current(&mut self, pair: &ChallengePair) {
        let exclusions = self.exclusions();
        self.current = pair.without(&exclusions);
    }

    pub fn store_next(&mut self, pair: &ChallengePair) {
        let exclusions = self.exclusions();
        self.next = pair.without(&exclusions);
    }

    pub fn snapshot(&self, loading: bool) -> SchedulerSnapshot {
        SchedulerSnapshot {
            level: self.level,
            current: self.current.clone(),
            next: self.next.clone(),
            loading,
            error: self.error.clone(),
            exhausted: self.exhausted,
        }
    }
}

/// Read-only view of the scheduler for the UI layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerSnapshot {
    pub level: Level,
    pub current: ChallengePair,
    pub next: ChallengePair,
    pub loading: bool,
    pub error: Option<String>,
    pub exhausted: bool,
}
