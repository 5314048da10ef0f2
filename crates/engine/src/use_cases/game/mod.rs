//! Game session use case.
//!
//! Two players alternate turns. On each turn the current player picks the
//! truth or the dare from the scheduler's current pair, or draws a wild card
//! from the upcoming pair, and then either completes it or skips.
//! Completed prompts are recorded per player and never offered again.
//!
//! In progressive mode the level steps up every `progressive_every`
//! completed turns, and whenever the current level runs out.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use truthdare_domain::{
    ChallengeKind, ChallengePair, DomainError, Item, ItemId, Level, Player, SessionId, UsedItems,
};

use super::challenge_pair::{ChallengePairScheduler, SchedulerError, SchedulerSnapshot};

/// Default number of completed turns between progressive level steps.
pub const DEFAULT_PROGRESSIVE_EVERY: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSettings {
    pub start_level: Level,
    pub progressive: bool,
    pub progressive_every: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            start_level: Level::default(),
            progressive: false,
            progressive_every: DEFAULT_PROGRESSIVE_EVERY,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Game has not started")]
    NotStarted,
    #[error("No {0} available this turn")]
    NothingToPick(ChallengeKind),
    #[error("No wild card available")]
    NoWildCard,
    #[error("Nothing selected to complete")]
    NothingSelected,
    #[error("Invalid game setup: {0}")]
    Setup(#[from] DomainError),
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

/// The prompt the current player chose.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub item: Item,
    pub wild_card: bool,
}

/// What happened on a finished turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutcome {
    /// Name of the player whose turn ended
    pub player: String,
    /// `None` when the turn was skipped
    pub played: Option<Selection>,
    pub level: Level,
    pub level_advanced: bool,
    /// Pair offered to the next player
    pub pair: ChallengePair,
    pub exhausted: bool,
}

/// Read-only view of a session for the UI layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub turn: u32,
    pub current_player: String,
    pub players: Vec<Player>,
    pub selection: Option<Selection>,
    pub used_items: UsedItems,
    pub scheduler: SchedulerSnapshot,
}

pub struct GameSession {
    id: SessionId,
    players: [Player; 2],
    settings: GameSettings,
    scheduler: ChallengePairScheduler,
    pool: Arc<[Item]>,
    used_items: UsedItems,
    excluded_ids: HashSet<ItemId>,
    turn: u32,
    completed_at_level: u32,
    selection: Option<Selection>,
    started: bool,
}

impl GameSession {
    pub fn new(
        players: [Player; 2],
        pool: impl Into<Arc<[Item]>>,
        settings: GameSettings,
        scheduler: ChallengePairScheduler,
    ) -> Result<Self, GameError> {
        if settings.progressive && settings.progressive_every == 0 {
            return Err(DomainError::validation("progressive_every must be at least 1").into());
        }
        Ok(Self {
            id: SessionId::new(),
            players,
            settings,
            scheduler,
            pool: pool.into(),
            used_items: UsedItems::new(),
            excluded_ids: HashSet::new(),
            turn: 0,
            completed_at_level: 0,
            selection: None,
            started: false,
        })
    }

    /// Hide prompts played in earlier sessions. Applies from the next fetch.
    pub fn exclude_previous(&mut self, ids: impl IntoIterator<Item = ItemId>) {
        self.excluded_ids.extend(ids);
        self.scheduler
            .update_used_items(self.used_items.clone(), self.excluded_ids.clone());
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn current_player(&self) -> &Player {
        &self.players[(self.turn % 2) as usize]
    }

    pub fn current_pair(&self) -> ChallengePair {
        self.scheduler.current_pair()
    }

    pub fn level(&self) -> Level {
        self.scheduler.level()
    }

    pub fn is_exhausted(&self) -> bool {
        self.scheduler.is_exhausted()
    }

    pub fn used_items(&self) -> &UsedItems {
        &self.used_items
    }

    pub fn scheduler(&self) -> &ChallengePairScheduler {
        &self.scheduler
    }

    /// Load the first pair.
    pub async fn start(&mut self) -> Result<ChallengePair, GameError> {
        self.scheduler.initialize(
            Arc::clone(&self.pool),
            self.settings.start_level,
            self.used_items.clone(),
            self.excluded_ids.clone(),
        );
        self.turn = 0;
        self.completed_at_level = 0;
        self.selection = None;
        self.started = true;

        let pair = self.scheduler.load_initial_pair().await?;
        tracing::info!(
            session_id = %self.id,
            level = %self.settings.start_level,
            pool = self.pool.len(),
            "Game session started"
        );
        Ok(pair)
    }

    /// Choose the truth or the dare from the current pair.
    pub fn pick(&mut self, kind: ChallengeKind) -> Result<Item, GameError> {
        self.ensure_started()?;
        let item = self
            .scheduler
            .current_pair()
            .get(kind)
            .cloned()
            .ok_or(GameError::NothingToPick(kind))?;
        self.selection = Some(Selection {
            item: item.clone(),
            wild_card: false,
        });
        Ok(item)
    }

    /// Draw a random prompt from the upcoming pair instead.
    pub async fn pick_wild_card(&mut self) -> Result<Item, GameError> {
        self.ensure_started()?;
        let item = self
            .scheduler
            .get_random_from_next_pair()
            .await
            .ok_or(GameError::NoWildCard)?;
        tracing::debug!(session_id = %self.id, item = %item.id(), "Wild card drawn");
        self.selection = Some(Selection {
            item: item.clone(),
            wild_card: true,
        });
        Ok(item)
    }

    /// The current player did the selected prompt.
    pub async fn complete(&mut self) -> Result<TurnOutcome, GameError> {
        self.ensure_started()?;
        let selection = self.selection.take().ok_or(GameError::NothingSelected)?;
        let player = self.current_player().name.clone();
        let item_id = selection.item.id().clone();

        self.used_items.insert(player.clone(), item_id.clone());
        self.scheduler
            .update_used_items(self.used_items.clone(), self.excluded_ids.clone());

        let moved = if selection.wild_card {
            self.scheduler.mark_wild_card_item_as_used(&item_id).await;
            self.scheduler.handle_wild_card_completion().await
        } else {
            self.scheduler.mark_item_as_used(&item_id, false).await;
            self.scheduler.move_to_next().await
        };
        self.turn += 1;
        self.completed_at_level += 1;
        tracing::info!(
            session_id = %self.id,
            player = %player,
            item = %item_id,
            wild_card = selection.wild_card,
            "Turn completed"
        );
        let mut pair = moved?;

        let level_advanced = self.maybe_advance().await?;
        if level_advanced {
            pair = self.scheduler.current_pair();
        }
        Ok(self.outcome(player, Some(selection), pair, level_advanced))
    }

    /// Pass the turn without playing; the pair moves on.
    pub async fn skip(&mut self) -> Result<TurnOutcome, GameError> {
        self.ensure_started()?;
        self.selection = None;
        let player = self.current_player().name.clone();

        let moved = self.scheduler.move_to_next().await;
        self.turn += 1;
        tracing::info!(session_id = %self.id, player = %player, "Turn skipped");
        let mut pair = moved?;

        let level_advanced = if self.settings.progressive && self.scheduler.is_exhausted() {
            self.advance_level().await?.is_some()
        } else {
            false
        };
        if level_advanced {
            pair = self.scheduler.current_pair();
        }
        Ok(self.outcome(player, None, pair, level_advanced))
    }

    pub async fn change_level(&mut self, level: Level) -> Result<ChallengePair, GameError> {
        self.ensure_started()?;
        self.selection = None;
        self.completed_at_level = 0;
        let pair = self.scheduler.change_level(level).await?;
        tracing::info!(session_id = %self.id, level = %level, "Level changed");
        Ok(pair)
    }

    /// Step up one level. Returns `None` at the top level.
    pub async fn advance_level(&mut self) -> Result<Option<Level>, GameError> {
        let Some(level) = self.level().next() else {
            return Ok(None);
        };
        self.change_level(level).await?;
        Ok(Some(level))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            turn: self.turn,
            current_player: self.current_player().name.clone(),
            players: self.players.to_vec(),
            selection: self.selection.clone(),
            used_items: self.used_items.clone(),
            scheduler: self.scheduler.snapshot(),
        }
    }

    /// Wait for background work, then clear the scheduler.
    pub async fn end(&mut self) {
        self.scheduler.settle().await;
        self.scheduler.reset();
        self.started = false;
        tracing::info!(
            session_id = %self.id,
            turns = self.turn,
            used = self.used_items.len(),
            "Game session ended"
        );
    }

    fn ensure_started(&self) -> Result<(), GameError> {
        if self.started {
            Ok(())
        } else {
            Err(GameError::NotStarted)
        }
    }

    async fn maybe_advance(&mut self) -> Result<bool, GameError> {
        if !self.settings.progressive {
            return Ok(false);
        }
        let due = self.completed_at_level >= self.settings.progressive_every;
        if !due && !self.scheduler.is_exhausted() {
            return Ok(false);
        }
        Ok(self.advance_level().await?.is_some())
    }

    fn outcome(
        &self,
        player: String,
        played: Option<Selection>,
        pair: ChallengePair,
        level_advanced: bool,
    ) -> TurnOutcome {
        TurnOutcome {
            player,
            played,
            level: self.level(),
            level_advanced,
            pair,
            exhausted: self.scheduler.is_exhausted(),
        }
    }
}

#[cfg(test)]
mod tests {
    use truthdare_domain::Gender;

    use super::*;
    use crate::infrastructure::random::FixedRandom;
    use crate::test_fixtures::items::{ids, level_deck};
    use crate::test_fixtures::ScriptedSource;
    use crate::use_cases::SchedulerConfig;

    fn players() -> [Player; 2] {
        [
            Player::new("Alex", Some(Gender::Female)).unwrap(),
            Player::new("Sam", Some(Gender::Male)).unwrap(),
        ]
    }

    fn session(pool: Vec<Item>, settings: GameSettings) -> GameSession {
        let scheduler = ChallengePairScheduler::new(
            ScriptedSource::new(),
            Arc::new(FixedRandom(0)),
            SchedulerConfig::default(),
        );
        GameSession::new(players(), pool, settings, scheduler).unwrap()
    }

    fn two_levels() -> Vec<Item> {
        let mut pool = level_deck(Level::Soft, 3);
        pool.extend(level_deck(Level::Mild, 3));
        pool
    }

    #[tokio::test]
    async fn actions_require_a_started_game() {
        let mut game = session(two_levels(), GameSettings::default());
        assert!(matches!(game.pick(ChallengeKind::Truth), Err(GameError::NotStarted)));
        assert!(matches!(game.skip().await, Err(GameError::NotStarted)));
    }

    #[test]
    fn progressive_every_must_be_positive() {
        let scheduler = ChallengePairScheduler::new(
            ScriptedSource::new(),
            Arc::new(FixedRandom(0)),
            SchedulerConfig::default(),
        );
        let settings = GameSettings {
            progressive: true,
            progressive_every: 0,
            ..GameSettings::default()
        };
        let result = GameSession::new(players(), two_levels(), settings, scheduler);
        assert!(matches!(result, Err(GameError::Setup(_))));
    }

    #[tokio::test]
    async fn completing_records_item_for_player_and_passes_turn() {
        let mut game = session(two_levels(), GameSettings::default());
        game.start().await.unwrap();
        assert_eq!(game.current_player().name, "Alex");

        let truth = game.pick(ChallengeKind::Truth).unwrap();
        let outcome = game.complete().await.unwrap();

        assert_eq!(outcome.player, "Alex");
        assert_eq!(outcome.played.as_ref().map(|s| s.item.id()), Some(truth.id()));
        assert!(!outcome.pair.contains(truth.id()));
        assert_eq!(game.current_player().name, "Sam");
        assert!(game
            .used_items()
            .ids_for("Alex")
            .is_some_and(|ids| ids.contains(truth.id())));
        game.end().await;
    }

    #[tokio::test]
    async fn completing_without_selection_fails() {
        let mut game = session(two_levels(), GameSettings::default());
        game.start().await.unwrap();
        assert!(matches!(game.complete().await, Err(GameError::NothingSelected)));
    }

    #[tokio::test]
    async fn picking_missing_kind_fails() {
        let pool = vec![crate::test_fixtures::items::truth(Level::Soft, 1)];
        let mut game = session(pool, GameSettings::default());
        game.start().await.unwrap();
        assert!(matches!(
            game.pick(ChallengeKind::Dare),
            Err(GameError::NothingToPick(ChallengeKind::Dare))
        ));
    }

    #[tokio::test]
    async fn skipping_passes_turn_without_recording() {
        let mut game = session(two_levels(), GameSettings::default());
        game.start().await.unwrap();
        game.pick(ChallengeKind::Dare).unwrap();

        let outcome = game.skip().await.unwrap();
        assert!(outcome.played.is_none());
        assert!(game.used_items().is_empty());
        assert_eq!(game.turn(), 1);
        assert!(game.snapshot().selection.is_none());
    }

    #[tokio::test]
    async fn wild_card_is_recorded_and_not_reoffered() {
        let mut game = session(two_levels(), GameSettings::default());
        game.start().await.unwrap();
        game.scheduler().settle().await;

        let card = game.pick_wild_card().await.unwrap();
        let outcome = game.complete().await.unwrap();

        assert!(outcome.played.as_ref().is_some_and(|s| s.wild_card));
        assert!(!outcome.pair.contains(card.id()));
        game.scheduler().settle().await;
        assert!(!game.scheduler().next_pair().contains(card.id()));
    }

    #[tokio::test]
    async fn progressive_mode_steps_up_every_n_turns() {
        let settings = GameSettings {
            progressive: true,
            progressive_every: 2,
            ..GameSettings::default()
        };
        let mut game = session(two_levels(), settings);
        game.start().await.unwrap();

        game.pick(ChallengeKind::Truth).unwrap();
        let first = game.complete().await.unwrap();
        assert!(!first.level_advanced);
        assert_eq!(first.level, Level::Soft);

        game.pick(ChallengeKind::Truth).unwrap();
        let second = game.complete().await.unwrap();
        assert!(second.level_advanced);
        assert_eq!(second.level, Level::Mild);
        assert!(second.pair.items().all(|item| item.level() == Level::Mild));
    }

    #[tokio::test]
    async fn advance_level_stops_at_top() {
        let settings = GameSettings {
            start_level: Level::Kinky,
            ..GameSettings::default()
        };
        let mut game = session(level_deck(Level::Kinky, 1), settings);
        game.start().await.unwrap();
        assert_eq!(game.advance_level().await.unwrap(), None);
        assert_eq!(game.level(), Level::Kinky);
    }

    #[tokio::test]
    async fn previous_sessions_are_excluded() {
        let mut game = session(level_deck(Level::Soft, 2), GameSettings::default());
        game.exclude_previous(ids(&["soft-truth-1", "soft-dare-1"]));

        let pair = game.start().await.unwrap();
        assert_eq!(pair.truth.as_ref().map(|t| t.id().as_str()), Some("soft-truth-2"));
        assert_eq!(pair.dare.as_ref().map(|d| d.id().as_str()), Some("soft-dare-2"));
    }

    #[tokio::test]
    async fn snapshot_serializes_for_the_ui() {
        let mut game = session(two_levels(), GameSettings::default());
        game.start().await.unwrap();

        let json = serde_json::to_value(game.snapshot()).unwrap();
        assert_eq!(json["currentPlayer"], "Alex");
        assert_eq!(json["turn"], 0);
        assert_eq!(json["scheduler"]["level"], "soft");
        assert_eq!(json["players"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn end_resets_the_scheduler() {
        let mut game = session(two_levels(), GameSettings::default());
        game.start().await.unwrap();
        game.end().await;

        assert!(game.current_pair().is_empty());
        assert!(matches!(game.pick(ChallengeKind::Truth), Err(GameError::NotStarted)));
    }
}
