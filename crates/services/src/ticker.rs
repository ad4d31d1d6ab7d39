//! Periodic elapsed-time tick for an active quiz.

use std::fmt;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Background task publishing whole seconds since it was spawned.
///
/// The ticker only wakes the renderer; the session's own clock reading stays
/// authoritative for the stored elapsed time. Dropping the ticker aborts the
/// task, so no tick is observed once it is gone.
pub struct SessionTicker {
    ticks: watch::Receiver<u64>,
    handle: Option<JoinHandle<()>>,
    frozen: Option<u64>,
}

impl SessionTicker {
    /// Spawn the tick task on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn spawn(period: Duration) -> Self {
        let (tx, rx) = watch::channel(0_u64);
        let handle = tokio::spawn(async move {
            let start = Instant::now();
            let mut interval = time::interval_at(start + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(start.elapsed().as_secs()).is_err() {
                    break;
                }
            }
        });

        Self {
            ticks: rx,
            handle: Some(handle),
            frozen: None,
        }
    }

    /// A receiver that is notified on every tick.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.ticks.clone()
    }

    /// Latest published value, or the value at cancellation.
    #[must_use]
    pub fn latest(&self) -> u64 {
        self.frozen.unwrap_or_else(|| *self.ticks.borrow())
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.handle.is_none()
    }

    /// Stop the task. Returns `false` if it was already stopped.
    pub fn cancel(&mut self) -> bool {
        let Some(handle) = self.handle.take() else {
            return false;
        };
        handle.abort();
        self.frozen = Some(*self.ticks.borrow());
        true
    }
}

impl Drop for SessionTicker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl fmt::Debug for SessionTicker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTicker")
            .field("latest", &self.latest())
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn publishes_elapsed_seconds() {
        let ticker = SessionTicker::spawn(Duration::from_secs(1));
        let mut ticks = ticker.subscribe();

        ticks.changed().await.unwrap();
        assert_eq!(*ticks.borrow_and_update(), 1);
        ticks.changed().await.unwrap();
        assert_eq!(*ticks.borrow_and_update(), 2);
        assert_eq!(ticker.latest(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_is_idempotent_and_stops_ticks() {
        let mut ticker = SessionTicker::spawn(Duration::from_secs(1));
        let mut ticks = ticker.subscribe();
        ticks.changed().await.unwrap();

        assert!(ticker.cancel());
        assert!(!ticker.cancel());
        assert!(ticker.is_cancelled());
        assert_eq!(ticker.latest(), 1);

        // The sender goes away with the aborted task; nothing more arrives.
        assert!(ticks.changed().await.is_err());
        assert_eq!(*ticks.borrow(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_aborts_the_task() {
        let ticker = SessionTicker::spawn(Duration::from_secs(1));
        let mut ticks = ticker.subscribe();
        drop(ticker);

        time::advance(Duration::from_secs(5)).await;
        assert!(ticks.changed().await.is_err());
        assert_eq!(*ticks.borrow(), 0);
    }
}
