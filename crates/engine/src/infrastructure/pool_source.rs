//! In-memory item source.
//!
//! Filters the session's candidate pool locally. This is what the game uses
//! when the whole deck has been downloaded up front.

use async_trait::async_trait;
use truthdare_domain::{AudienceFilter, Item};

use crate::infrastructure::ports::{ItemQuery, ItemSource, SourceError};

#[derive(Debug, Clone, Default)]
pub struct PoolItemSource {
    audience: AudienceFilter,
}

impl PoolItemSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only return items suitable for `audience`.
    pub fn with_audience(audience: AudienceFilter) -> Self {
        Self { audience }
    }

    pub fn filter(&self, query: &ItemQuery) -> Vec<Item> {
        query
            .pool
            .iter()
            .filter(|item| query.accepts(item) && self.audience.matches(item))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ItemSource for PoolItemSource {
    async fn fetch_available_items(&self, query: ItemQuery) -> Result<Vec<Item>, SourceError> {
        let items = self.filter(&query);
        tracing::trace!(
            level = %query.level,
            kind = %query.kind,
            eligible = items.len(),
            "Filtered item pool"
        );
        Ok(items)
    }
}
