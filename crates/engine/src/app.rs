//! Application state and composition.

use std::sync::Arc;

use truthdare_domain::{AudienceFilter, Item, Player};

use crate::config::EngineConfig;
use crate::infrastructure::{
    content::{self, ContentError},
    pool_source::PoolItemSource,
    ports::{ItemSource, RandomPort},
    random::SystemRandom,
};
use crate::use_cases::{ChallengePairScheduler, GameError, GameSession};

/// Main application state.
///
/// Holds the content pool and the port implementations every session
/// shares. Each session gets its own scheduler.
pub struct App {
    pub source: Arc<dyn ItemSource>,
    pub random: Arc<dyn RandomPort>,
    pub pool: Arc<[Item]>,
    pub config: EngineConfig,
}

impl App {
    pub fn new(
        source: Arc<dyn ItemSource>,
        random: Arc<dyn RandomPort>,
        pool: impl Into<Arc<[Item]>>,
        config: EngineConfig,
    ) -> Self {
        Self {
            source,
            random,
            pool: pool.into(),
            config,
        }
    }

    /// Wire the in-memory source and system randomness from configuration.
    pub fn from_config(config: EngineConfig) -> Result<Self, ContentError> {
        let pool = match &config.content_path {
            Some(path) => content::load_deck(path)?,
            None => {
                tracing::info!("TRUTHDARE_CONTENT_PATH not set, using built-in deck");
                content::builtin_deck()
            }
        };

        let audience = config
            .required_tags
            .iter()
            .fold(AudienceFilter::default(), |filter, tag| {
                filter.with_required_tag(tag.as_str())
            });
        let source: Arc<dyn ItemSource> = Arc::new(PoolItemSource::with_audience(audience));
        let random: Arc<dyn RandomPort> = Arc::new(SystemRandom::new());

        Ok(Self::new(source, random, pool, config))
    }

    pub fn scheduler(&self) -> ChallengePairScheduler {
        ChallengePairScheduler::new(
            Arc::clone(&self.source),
            Arc::clone(&self.random),
            self.config.scheduler,
        )
    }

    /// New, not yet started session over the whole pool.
    pub fn new_session(&self, players: [Player; 2]) -> Result<GameSession, GameError> {
        GameSession::new(
            players,
            Arc::clone(&self.pool),
            self.config.game,
            self.scheduler(),
        )
    }
}
