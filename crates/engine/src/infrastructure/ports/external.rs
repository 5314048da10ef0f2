//! Content store port.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use truthdare_domain::{ChallengeKind, Item, ItemId, Level};

use super::error::SourceError;

/// One "give me eligible items" request.
///
/// `pool` is the candidate set the session was initialized with. A remote
/// source that picks server-side is free to ignore it and only honour the
/// level, kind and exclusions.
#[derive(Debug, Clone)]
pub struct ItemQuery {
    pub pool: Arc<[Item]>,
    pub level: Level,
    pub kind: ChallengeKind,
    /// Ids played in this game (caller's record plus ids consumed this session)
    pub used_ids: Arc<HashSet<ItemId>>,
    /// Ids to hide because they were played in earlier sessions
    pub excluded_ids: Arc<HashSet<ItemId>>,
}

impl ItemQuery {
    pub fn is_excluded(&self, id: &ItemId) -> bool {
        self.used_ids.contains(id) || self.excluded_ids.contains(id)
    }

    /// Whether `item` satisfies level, kind and exclusions.
    pub fn accepts(&self, item: &Item) -> bool {
        item.level() == self.level && item.kind() == self.kind && !self.is_excluded(item.id())
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Every item eligible for `query`, in no particular order.
    async fn fetch_available_items(&self, query: ItemQuery) -> Result<Vec<Item>, SourceError>;
}
