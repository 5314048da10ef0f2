//! Test fixtures and common test helpers.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_fixtures::{items, ScriptedSource};
//!
//! let source = ScriptedSource::new();
//! let pool = items::pool(&[items::truth(Level::Soft, 1), items::dare(Level::Soft, 1)]);
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use truthdare_domain::{Item, Level};

use crate::infrastructure::pool_source::PoolItemSource;
use crate::infrastructure::ports::{ItemQuery, ItemSource, SourceError};

// =============================================================================
// Items
// =============================================================================

pub mod items {
    use std::collections::HashSet;
    use std::sync::Arc;

    use truthdare_domain::{ChallengeKind, Item, ItemId, Level};

    fn item(level: Level, kind: ChallengeKind, n: usize) -> Item {
        let id = format!("{}-{}-{}", level.as_str(), kind.as_str(), n);
        let text = format!("{} {} #{}", level.display_name(), kind.display_name(), n);
        Item::new(id, level, kind, text)
    }

    /// `soft-truth-1` style truth.
    pub fn truth(level: Level, n: usize) -> Item {
        item(level, ChallengeKind::Truth, n)
    }

    pub fn dare(level: Level, n: usize) -> Item {
        item(level, ChallengeKind::Dare, n)
    }

    /// `count` truths and `count` dares at `level`.
    pub fn level_deck(level: Level, count: usize) -> Vec<Item> {
        (1..=count)
            .flat_map(|n| [truth(level, n), dare(level, n)])
            .collect()
    }

    pub fn pool(items: &[Item]) -> Arc<[Item]> {
        items.to_vec().into()
    }

    pub fn ids(ids: &[&str]) -> HashSet<ItemId> {
        ids.iter().map(|id| ItemId::new(*id)).collect()
    }
}

// =============================================================================
// Item source with scripted latency and failures
// =============================================================================

/// Wraps [`PoolItemSource`], counting calls and optionally delaying or failing.
#[derive(Default)]
pub struct ScriptedSource {
    inner: PoolItemSource,
    delay_ms: AtomicUsize,
    failing: AtomicBool,
    calls: Mutex<Vec<Level>>,
}

impl ScriptedSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_delay(delay: Duration) -> Arc<Self> {
        let source = Self::default();
        source.set_delay(delay);
        Arc::new(source)
    }

    pub fn failing() -> Arc<Self> {
        let source = Self::default();
        source.set_failing(true);
        Arc::new(source)
    }

    pub fn set_delay(&self, delay: Duration) {
        let millis = usize::try_from(delay.as_millis()).unwrap_or(usize::MAX);
        self.delay_ms.store(millis, Ordering::SeqCst);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Total `fetch_available_items` calls. A pair fetch makes two.
    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_for(&self, level: Level) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|called| **called == level)
            .count()
    }
}

#[async_trait]
impl ItemSource for ScriptedSource {
    async fn fetch_available_items(&self, query: ItemQuery) -> Result<Vec<Item>, SourceError> {
        self.calls.lock().unwrap().push(query.level);

        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay as u64)).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(SourceError::query(query.level, query.kind, "scripted failure"));
        }
        self.inner.fetch_available_items(query).await
    }
}
