//! Smoothed loading indicator.
//!
//! Loading that finishes quickly is never shown. Once shown, the indicator
//! stays up for a minimum time so it does not flash:
//!
//! | operation took          | indicator                                  |
//! |-------------------------|--------------------------------------------|
//! | < `show_delay`          | never visible                              |
//! | `show_delay..min_visible` | visible until `min_visible` after start |
//! | >= `min_visible`        | hidden as soon as the operation finishes   |
//!
//! Starting a new episode cancels every pending timer of the previous one.
//! Must be used from within a Tokio runtime.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Delay before a running operation shows the loading indicator.
pub const LOADING_SHOW_DELAY: Duration = Duration::from_millis(100);

/// Minimum time, measured from the start of the operation, that a shown
/// indicator stays visible.
pub const LOADING_MIN_VISIBLE: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadingTimings {
    pub show_delay: Duration,
    pub min_visible: Duration,
}

impl Default for LoadingTimings {
    fn default() -> Self {
        Self {
            show_delay: LOADING_SHOW_DELAY,
            min_visible: LOADING_MIN_VISIBLE,
        }
    }
}

struct Episode {
    visible: bool,
    started_at: Option<Instant>,
    timer: CancellationToken,
}

#[derive(Clone)]
pub struct LoadingIndicator {
    timings: LoadingTimings,
    inner: Arc<Mutex<Episode>>,
}

fn lock(inner: &Mutex<Episode>) -> MutexGuard<'_, Episode> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl LoadingIndicator {
    pub fn new(timings: LoadingTimings) -> Self {
        Self {
            timings,
            inner: Arc::new(Mutex::new(Episode {
                visible: false,
                started_at: None,
                timer: CancellationToken::new(),
            })),
        }
    }

    /// Whether the indicator should currently be displayed.
    pub fn is_visible(&self) -> bool {
        lock(&self.inner).visible
    }

    /// Whether an episode has begun and not yet finished.
    pub fn is_active(&self) -> bool {
        lock(&self.inner).started_at.is_some()
    }

    /// Start a loading episode.
    pub fn begin(&self) {
        let token = {
            let mut episode = lock(&self.inner);
            episode.timer.cancel();
            episode.timer = CancellationToken::new();
            episode.visible = false;
            episode.started_at = Some(Instant::now());
            episode.timer.clone()
        };
        self.schedule(token, self.timings.show_delay, true);
    }

    /// End the current episode, applying the minimum visible duration.
    pub fn finish(&self) {
        let (token, remaining) = {
            let mut episode = lock(&self.inner);
            let Some(started_at) = episode.started_at.take() else {
                return;
            };
            episode.timer.cancel();

            let elapsed = started_at.elapsed();
            if elapsed < self.timings.show_delay || elapsed >= self.timings.min_visible {
                episode.visible = false;
                return;
            }

            // Slow enough to have been shown: hold it until min_visible.
            episode.visible = true;
            episode.timer = CancellationToken::new();
            (episode.timer.clone(), self.timings.min_visible - elapsed)
        };
        self.schedule(token, remaining, false);
    }

    /// Drop the current episode and hide the indicator immediately.
    pub fn cancel(&self) {
        let mut episode = lock(&self.inner);
        episode.timer.cancel();
        episode.started_at = None;
        episode.visible = false;
    }

    fn schedule(&self, token: CancellationToken, after: Duration, visible: bool) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(after) => {
                    let mut episode = lock(&inner);
                    // Re-checked under the lock: begin() cancels while holding it.
                    if !token.is_cancelled() {
                        episode.visible = visible;
                    }
                }
            }
        });
    }
}

impl Default for LoadingIndicator {
    fn default() -> Self {
        Self::new(LoadingTimings::default())
    }
}
