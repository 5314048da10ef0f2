//! Truth-or-Dare Engine - scripted session runner.
//!
//! Plays a fixed number of turns between two players against the configured
//! content deck and logs every transition.

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use truthdare_domain::{ChallengeKind, Gender, Player};
use truthdare_engine::{config::load_dotenv_from_repo_root, App, EngineConfig, GameSession};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the binary may be run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "truthdare_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Truth-or-Dare Engine");

    let config = EngineConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        start_level = %config.game.start_level,
        turns = config.turns,
        progressive = config.game.progressive,
        show_delay_ms = config.scheduler.loading.show_delay.as_millis() as u64,
        min_visible_ms = config.scheduler.loading.min_visible.as_millis() as u64,
        "Configuration loaded"
    );

    let app = App::from_config(config).context("failed to load content deck")?;
    let players = [
        Player::new("Alex", Some(Gender::Female))?,
        Player::new("Sam", Some(Gender::Male))?,
    ];
    let mut session = app.new_session(players)?;
    session.start().await?;

    let turns = app.config.turns;
    for turn in 0..turns {
        if session.is_exhausted() {
            match session.advance_level().await? {
                Some(level) => tracing::info!(level = %level, "Level exhausted, moving up"),
                None => {
                    tracing::info!("Every level exhausted");
                    break;
                }
            }
        }
        play_turn(&mut session, turn).await?;
    }

    let snapshot = serde_json::to_string_pretty(&session.snapshot())?;
    tracing::debug!(snapshot = %snapshot, "Final session state");
    session.end().await;

    Ok(())
}

/// Skip every fifth turn, draw a wild card every third, otherwise alternate
/// truth and dare.
async fn play_turn(session: &mut GameSession, turn: u32) -> anyhow::Result<()> {
    if turn % 5 == 4 {
        session.skip().await?;
        return Ok(());
    }

    let picked = if turn % 3 == 2 {
        session.pick_wild_card().await.ok()
    } else {
        let (preferred, other) = if turn % 2 == 0 {
            (ChallengeKind::Truth, ChallengeKind::Dare)
        } else {
            (ChallengeKind::Dare, ChallengeKind::Truth)
        };
        session
            .pick(preferred)
            .or_else(|_| session.pick(other))
            .ok()
    };

    let Some(item) = picked else {
        tracing::info!(player = %session.current_player().name, "Nothing to play, skipping");
        session.skip().await?;
        return Ok(());
    };

    tracing::info!(
        player = %session.current_player().name,
        kind = %item.kind(),
        level = %item.level(),
        text = item.text(),
        "Playing"
    );
    let outcome = session.complete().await?;
    if outcome.level_advanced {
        tracing::info!(level = %outcome.level, "Level advanced");
    }
    Ok(())
}
