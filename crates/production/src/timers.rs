//! Timer management for production runner.
//!
//! Provides tokio-based timer implementation for the deterministic state machine.
//! Each timer is a tokio task that posts the timer's event into the node's
//! own mailbox, so it is processed in order with every other event.

use std::collections::HashMap;
use std::time::Duration;
use synod_core::{Event, TimerId};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

/// Manages timers for the production runner.
pub struct TimerManager {
    /// Active timers (id -> task handle).
    timers: HashMap<TimerId, JoinHandle<()>>,
    /// The owning node's mailbox.
    event_tx: mpsc::UnboundedSender<Event>,
}

impl TimerManager {
    /// Create a new timer manager posting into `event_tx`.
    pub fn new(event_tx: mpsc::UnboundedSender<Event>) -> Self {
        Self {
            timers: HashMap::new(),
            event_tx,
        }
    }

    /// Set a timer that will fire after the given duration.
    ///
    /// If a timer with the same ID is pending, it is replaced.
    pub fn set_timer(&mut self, id: TimerId, duration: Duration) {
        if let Some(previous) = self.timers.remove(&id) {
            previous.abort();
        }

        let event_tx = self.event_tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            trace!(timer_id = ?id, "Timer fired");
            // The mailbox is gone once the node shut down.
            let _ = event_tx.send(id.event());
        });

        self.timers.insert(id, handle);
        trace!(timer_id = ?id, ?duration, "Timer set");
    }

    /// Cancel all timers.
    ///
    /// Called during shutdown.
    pub fn cancel_all(&mut self) {
        for (id, handle) in self.timers.drain() {
            handle.abort();
            trace!(?id, "Timer cancelled (shutdown)");
        }
    }

    /// Get the number of timers set and not yet cancelled.
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }
}

impl Drop for TimerManager {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
