//! Challenge pair scheduling.
//!
//! Keeps one truth and one dare ready for the current player and prefetches
//! the pair for the following turn in the background. The flows are:
//!
//! 1. `load_initial_pair` fills `current` and starts a prefetch of `next`
//! 2. Completing a prompt: `mark_item_as_used` (awaits a fresh `next`),
//!    then `move_to_next`
//! 3. Skipping: `move_to_next` (promotes `next`, prefetches in background)
//! 4. Wild card: `get_random_from_next_pair`, `mark_wild_card_item_as_used`,
//!    `handle_wild_card_completion`
//! 5. `change_level` switches level, reusing the per-level cache
//!
//! A level whose fetch comes back with neither a truth nor a dare is
//! *exhausted*. That is a state the UI checks, not an error.
//!
//! Background prefetches never overlap each other. Results that arrive after
//! `next` was rewritten by a foreground operation (or after a reset or level
//! change) are discarded.

mod state;


use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use truthdare_domain::{ChallengeKind, ChallengePair, Item, ItemId, Level, UsedItems};

pub use state::SchedulerSnapshot;
use state::SchedulerState;

use crate::infrastructure::loading::{LoadingIndicator, LoadingTimings};
use crate::infrastructure::ports::{ItemQuery, ItemSource, RandomPort, SourceError};

/// Scheduler tuning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub loading: LoadingTimings,
}

struct Inner {
    source: Arc<dyn ItemSource>,
    random: Arc<dyn RandomPort>,
    loading: LoadingIndicator,
    state: Mutex<SchedulerState>,
    prefetch_task: Mutex<Option<JoinHandle<()>>>,
}

/// Lookahead scheduler for truth/dare pairs.
///
/// Cheap to clone; clones share state. One scheduler belongs to one game
/// session. All async operations must run inside a Tokio runtime.
#[derive(Clone)]
pub struct ChallengePairScheduler {
    inner: Arc<Inner>,
}

impl ChallengePairScheduler {
    pub fn new(
        source: Arc<dyn ItemSource>,
        random: Arc<dyn RandomPort>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                random,
                loading: LoadingIndicator::new(config.loading),
                state: Mutex::new(SchedulerState::new()),
                prefetch_task: Mutex::new(None),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, SchedulerState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn prefetch_task(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.inner
            .prefetch_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Start over with a new pool. Does not fetch.
    pub fn initialize(
        &self,
        pool: impl Into<Arc<[Item]>>,
        level: Level,
        used_items: UsedItems,
        excluded_ids: HashSet<ItemId>,
    ) {
        self.inner.loading.cancel();
        let mut state = self.state();
        let mut fresh = SchedulerState::succeeding(&state);
        fresh.pool = pool.into();
        fresh.level = level;
        fresh.used_items = used_items;
        fresh.excluded_ids = excluded_ids;
        *state = fresh;
        tracing::debug!(level = %level, pool = state.pool.len(), "Challenge scheduler initialized");
    }

    /// Clear everything, including the level cache.
    pub fn reset(&self) {
        self.inner.loading.cancel();
        let mut state = self.state();
        *state = SchedulerState::succeeding(&state);
        tracing::debug!("Challenge scheduler reset");
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn current_pair(&self) -> ChallengePair {
        self.state().current.clone()
    }

    pub fn next_pair(&self) -> ChallengePair {
        self.state().next.clone()
    }

    pub fn has_next_pair(&self) -> bool {
        !self.state().next.is_empty()
    }

    /// Smoothed loading flag, see [`LoadingIndicator`].
    pub fn is_loading(&self) -> bool {
        self.inner.loading.is_visible()
    }

    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    pub fn is_exhausted(&self) -> bool {
        self.state().exhausted
    }

    pub fn level(&self) -> Level {
        self.state().level
    }

    pub fn cached_pair(&self, level: Level) -> Option<ChallengePair> {
        self.state().level_cache.get(&level).cloned()
    }

    pub fn snapshot(&self) -> SchedulerSnapshot {
        let loading = self.is_loading();
        self.state().snapshot(loading)
    }

    // =========================================================================
    // Fetching
    // =========================================================================

    /// Fetch a pair for the active level.
    pub async fn fetch_pair(&self) -> Result<ChallengePair, SourceError> {
        let level = self.level();
        self.fetch_pair_for(level).await
    }

    /// Pick one random eligible truth and one random eligible dare for `level`.
    ///
    /// The two picks are independent, so a partial pair is a normal result.
    /// Always refreshes the level cache; an empty result marks the active
    /// level exhausted.
    pub async fn fetch_pair_for(&self, level: Level) -> Result<ChallengePair, SourceError> {
        let (generation, pool, used_ids, excluded_ids) = {
            let state = self.state();
            (
                state.generation,
                Arc::clone(&state.pool),
                Arc::new(state.used_ids()),
                Arc::new(state.excluded_ids.clone()),
            )
        };
        let query = |kind: ChallengeKind| ItemQuery {
            pool: Arc::clone(&pool),
            level,
            kind,
            used_ids: Arc::clone(&used_ids),
            excluded_ids: Arc::clone(&excluded_ids),
        };
        let truth_query = query(ChallengeKind::Truth);
        let dare_query = query(ChallengeKind::Dare);

        let (truths, dares) = tokio::try_join!(
            self.inner.source.fetch_available_items(truth_query.clone()),
            self.inner.source.fetch_available_items(dare_query.clone()),
        )?;
        let pair = ChallengePair::new(self.pick(&truth_query, truths), self.pick(&dare_query, dares));

        let mut state = self.state();
        if state.generation != generation {
            tracing::debug!(level = %level, "Discarding fetch from a previous generation");
            return Ok(pair);
        }
        if pair.is_empty() && state.level == level {
            tracing::debug!(level = %level, "Level exhausted");
            state.exhausted = true;
        }
        state.level_cache.insert(level, pair.clone());
        Ok(pair)
    }

    fn pick(&self, query: &ItemQuery, items: Vec<Item>) -> Option<Item> {
        // Sources are trusted to filter, but a remote one may not.
        let mut eligible: Vec<Item> = items.into_iter().filter(|item| query.accepts(item)).collect();
        if eligible.is_empty() {
            return None;
        }
        let index = self
            .inner
            .random
            .pick_index(eligible.len())
            .min(eligible.len() - 1);
        Some(eligible.swap_remove(index))
    }

    /// Fill `current` for the active level and start prefetching `next`.
    pub async fn load_initial_pair(&self) -> Result<ChallengePair, SchedulerError> {
        self.inner.loading.begin();
        let generation = self.state().generation;
        let pair = match self.fetch_pair().await {
            Ok(pair) => pair,
            Err(e) => return Err(self.fail_foreground(SchedulerError::InitialLoad(e))),
        };

        let (current, exhausted) = {
            let mut state = self.state();
            if state.generation != generation {
                // Reset or re-initialized while loading; nothing to store into.
                drop(state);
                self.inner.loading.cancel();
                return Ok(pair);
            }
            state.exhausted = pair.is_empty();
            state.store_current(&pair);
            (state.current.clone(), state.exhausted)
        };
        tracing::debug!(
            truth = ?slot_id(&current.truth),
            dare = ?slot_id(&current.dare),
            exhausted,
            "Initial pair loaded"
        );

        if !exhausted {
            self.load_next_pair_in_background();
        }
        self.inner.loading.finish();
        Ok(current)
    }

    /// Prefetch `next` and wait for it.
    ///
    /// No-op while another prefetch is in flight or the level is exhausted.
    /// Failures are recorded in [`error`](Self::error) and not returned.
    pub async fn load_next_pair(&self) {
        if let Some(epoch) = self.claim_prefetch() {
            self.run_prefetch(epoch).await;
        }
    }

    /// Prefetch `next` on a detached task.
    pub fn load_next_pair_in_background(&self) {
        let Some(epoch) = self.claim_prefetch() else {
            return;
        };
        let scheduler = self.clone();
        let handle = tokio::spawn(async move { scheduler.run_prefetch(epoch).await });
        *self.prefetch_task() = Some(handle);
    }

    /// Wait for the most recent background prefetch to finish.
    pub async fn settle(&self) {
        loop {
            let handle = self.prefetch_task().take();
            let Some(handle) = handle else {
                break;
            };
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Background prefetch task failed");
            }
        }
    }

    fn claim_prefetch(&self) -> Option<u64> {
        let mut state = self.state();
        if state.prefetching || state.exhausted {
            tracing::trace!(
                prefetching = state.prefetching,
                exhausted = state.exhausted,
                "Skipping next-pair prefetch"
            );
            return None;
        }
        state.prefetching = true;
        Some(state.next_epoch)
    }

    /// Claim `next` for a foreground refresh, abandoning any in-flight prefetch.
    fn claim_next_for_refresh(&self) -> u64 {
        let mut state = self.state();
        state.invalidate_next();
        state.prefetching = true;
        state.next_epoch
    }

    async fn run_prefetch(&self, epoch: u64) {
        // A detached prefetch may start after a reset or foreground refresh.
        let still_wanted = self.state().next_epoch == epoch;
        if !still_wanted {
            tracing::debug!("Skipping superseded next-pair prefetch");
            return;
        }
        let result = self.fetch_pair().await;

        let mut state = self.state();
        if state.next_epoch != epoch {
            tracing::debug!("Discarding stale next-pair prefetch");
            return;
        }
        state.prefetching = false;
        match result {
            Ok(pair) => {
                if pair.is_empty() {
                    state.exhausted = true;
                }
                state.store_next(&pair);
                tracing::debug!(
                    truth = ?slot_id(&state.next.truth),
                    dare = ?slot_id(&state.next.dare),
                    "Next pair ready"
                );
            }
            Err(e) => {
                let error = SchedulerError::NextPairLoad(e);
                tracing::warn!(error = %error, cause = %source_message(&error), "Next-pair prefetch failed");
                state.error = Some(error.to_string());
            }
        }
    }

    fn fail_foreground(&self, error: SchedulerError) -> SchedulerError {
        tracing::error!(error = %error, cause = %source_message(&error), "Challenge fetch failed");
        self.state().error = Some(error.to_string());
        self.inner.loading.cancel();
        error
    }

    // =========================================================================
    // Consumption
    // =========================================================================

    /// Advance past the current pair (skip path).
    ///
    /// Promotes `next` into `current`. A promoted pair missing either slot
    /// is refilled by one synchronous fetch. A new `next` is prefetched in the
    /// background unless the level is exhausted, even when the refill failed.
    pub async fn move_to_next(&self) -> Result<ChallengePair, SchedulerError> {
        let promoted = {
            let mut state = self.state();
            let next = std::mem::take(&mut state.next);
            state.invalidate_next();
            state.store_current(&next);
            state.current.clone()
        };

        let mut outcome = Ok(());
        if !promoted.is_complete() {
            tracing::debug!(
                truth = ?slot_id(&promoted.truth),
                dare = ?slot_id(&promoted.dare),
                "Promoted pair incomplete, refilling"
            );
            let generation = self.state().generation;
            match self.fetch_pair().await {
                Ok(pair) => {
                    let mut state = self.state();
                    if state.generation == generation {
                        state.exhausted = pair.is_empty();
                        state.store_current(&pair);
                    }
                }
                Err(e) => {
                    let error = SchedulerError::NextPairLoad(e);
                    tracing::error!(error = %error, cause = %source_message(&error), "Refilling current pair failed");
                    self.state().error = Some(error.to_string());
                    outcome = Err(error);
                }
            }
        }

        let exhausted = self.is_exhausted();
        if !exhausted {
            self.load_next_pair_in_background();
        }
        outcome.map(|()| self.current_pair())
    }

    /// Remove a played item from its pair and make sure `next` is ready.
    ///
    /// Regular items are removed from `current`, wild cards from `next`.
    /// The sibling slot is kept. Unlike `move_to_next`, the refetch of
    /// `next` is awaited because the following turn renders it right away.
    pub async fn mark_item_as_used(&self, item_id: &ItemId, is_wild_card: bool) {
        let exhausted = {
            let mut state = self.state();
            state.consumed.insert(item_id.clone());
            let pair = if is_wild_card {
                &mut state.next
            } else {
                &mut state.current
            };
            let removed = pair.remove(item_id);
            if removed.is_none() {
                tracing::debug!(item = %item_id, is_wild_card, "Used item was not in its pair");
            }
            if is_wild_card && state.next.is_empty() {
                state.next = ChallengePair::empty();
            }
            state.exhausted
        };

        if !exhausted {
            let epoch = self.claim_next_for_refresh();
            self.run_prefetch(epoch).await;
        }
    }

    pub async fn mark_wild_card_item_as_used(&self, item_id: &ItemId) {
        self.mark_item_as_used(item_id, true).await;
    }

    /// Advance after a wild card was played. Same transition as `move_to_next`.
    pub async fn handle_wild_card_completion(&self) -> Result<ChallengePair, SchedulerError> {
        self.move_to_next().await
    }

    /// Draw a wild card from the prefetched pair.
    ///
    /// Fetches `next` first if it is empty and the level is not exhausted.
    /// Returns `None` when nothing is available.
    pub async fn get_random_from_next_pair(&self) -> Option<Item> {
        let needs_fetch = {
            let state = self.state();
            state.next.is_empty() && !state.exhausted
        };
        if needs_fetch {
            let epoch = self.claim_next_for_refresh();
            self.run_prefetch(epoch).await;
        }

        let candidates: Vec<Item> = self.state().next.items().cloned().collect();
        if candidates.is_empty() {
            return None;
        }
        let index = self
            .inner
            .random
            .pick_index(candidates.len())
            .min(candidates.len() - 1);
        candidates.into_iter().nth(index)
    }

    // =========================================================================
    // Level & exclusions
    // =========================================================================

    /// Switch to `level`, reusing its cached pair when there is one.
    pub async fn change_level(&self, level: Level) -> Result<ChallengePair, SchedulerError> {
        self.inner.loading.begin();
        let (generation, cached) = {
            let mut state = self.state();
            state.generation += 1;
            let generation = state.generation;
            state.invalidate_next();
            state.level = level;
            state.exhausted = false;
            state.error = None;
            state.next = ChallengePair::empty();
            let exclusions = state.exclusions();
            let cached = state
                .level_cache
                .get(&level)
                .map(|pair| (pair.is_empty(), pair.without(&exclusions)));
            (generation, cached)
        };

        let pair = match cached {
            // A cached empty pair means the level was already exhausted.
            Some((was_empty, pair)) if was_empty || !pair.is_empty() => {
                tracing::debug!(level = %level, "Level cache hit");
                pair
            }
            _ => match self.fetch_pair_for(level).await {
                Ok(pair) => pair,
                Err(e) => return Err(self.fail_foreground(SchedulerError::LevelChange(e))),
            },
        };

        let (current, exhausted) = {
            let mut state = self.state();
            if state.generation != generation {
                // Reset, re-initialized or switched again while fetching.
                drop(state);
                tracing::debug!(level = %level, "Discarding superseded level change");
                self.inner.loading.cancel();
                return Ok(pair);
            }
            state.store_current(&pair);
            state.next = ChallengePair::empty();
            state.exhausted = pair.is_empty();
            (state.current.clone(), state.exhausted)
        };
        tracing::debug!(level = %level, exhausted, "Level changed");

        if !exhausted {
            self.load_next_pair_in_background();
        }
        self.inner.loading.finish();
        Ok(current)
    }

    /// Replace the exclusion record. Does not refetch.
    pub fn update_used_items(&self, used_items: UsedItems, excluded_ids: HashSet<ItemId>) {
        let mut state = self.state();
        state.used_items = used_items;
        state.excluded_ids = excluded_ids;
    }
}

fn slot_id(slot: &Option<Item>) -> Option<&str> {
    slot.as_ref().map(|item| item.id().as_str())
}

fn source_message(error: &SchedulerError) -> String {
    std::error::Error::source(error)
        .map(ToString::to_string)
        .unwrap_or_default()
}

/// Challenge loading failures. The message is what the UI displays.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SchedulerError {
    #[error("Failed to load challenges")]
    InitialLoad(#[source] SourceError),
    #[error("Failed to load next challenges")]
    NextPairLoad(#[source] SourceError),
    #[error("Failed to load challenges for the new level")]
    LevelChange(#[source] SourceError),
}
