//! Outbound snapshot rate limiting.
//!
//! Ticks run as soon as every player has acted, which can be much faster than
//! clients want to receive updates. [`BroadcastThrottle`] decides whether a
//! snapshot may go out now or how long to wait, and [`DeferredBroadcast`]
//! holds the single pending timer for a game. Scheduling again replaces the
//! pending timer, so a burst of ticks collapses into one snapshot carrying
//! whatever state exists when the timer fires.

use log::debug;
use shared::GameId;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};

/// Minimum-interval limiter for one game's broadcasts.
#[derive(Debug, Clone)]
pub struct BroadcastThrottle {
    interval: Duration,
    last_broadcast: Option<Instant>,
}

impl BroadcastThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_broadcast: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn last_broadcast(&self) -> Option<Instant> {
        self.last_broadcast
    }

    /// Time left before the next broadcast is allowed, or `None` if one may
    /// be sent right away.
    pub fn wait(&self, now: Instant) -> Option<Duration> {
        let last = self.last_broadcast?;
        let elapsed = now.saturating_duration_since(last);
        self.interval
            .checked_sub(elapsed)
            .filter(|wait| !wait.is_zero())
    }

    pub fn record(&mut self, now: Instant) {
        self.last_broadcast = Some(now);
    }
}

/// Cancellable handle for a game's pending broadcast timer.
///
/// When the timer fires it posts the game id on `due`; the owner of the game
/// then performs the broadcast on its own task.
#[derive(Debug, Default)]
pub struct DeferredBroadcast {
    handle: Option<JoinHandle<()>>,
}

impl DeferredBroadcast {
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Replaces any pending timer with one firing after `wait`.
    pub fn schedule(&mut self, game_id: GameId, wait: Duration, due: mpsc::UnboundedSender<GameId>) {
        self.cancel();
        debug!("Game {}: broadcast deferred by {:?}", game_id, wait);

        self.handle = Some(tokio::spawn(async move {
            sleep(wait).await;
            // The receiver only disappears when the server shuts down
            let _ = due.send(game_id);
        }));
    }

    /// Aborts the pending timer, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Clears the handle after its timer fired. Returns false if nothing was
    /// pending, meaning the firing was already superseded.
    pub fn take_fired(&mut self) -> bool {
        self.handle.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for DeferredBroadcast {
    fn drop(&mut self) {
        self.cancel();
    }
}
