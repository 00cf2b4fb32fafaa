//! One-shot, cancellable deadline timers for Wordsiege rooms.
//!
//! A room schedules a timer per disconnected player; when the deadline
//! passes, the timer injects a message into the room actor's own command
//! channel. Reconnection cancels the timer. If cancellation races the
//! fire, the injected message still arrives — the receiver is expected
//! to re-check state and treat a stale fire as a no-op.
//!
//! # Integration
//!
//! ```ignore
//! timers.schedule(player_id, grace, self_tx.clone(),
//!     RoomCommand::GraceExpired { player_id });
//! // later, on reconnect:
//! timers.cancel(&player_id);
//! ```

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

/// A set of pending deadline timers, keyed so each key has at most one.
///
/// Scheduling a key that already has a pending timer replaces it — the
/// older deadline is aborted. Dropping the set aborts everything still
/// pending.
pub struct DeadlineTimers<K> {
    pending: HashMap<K, JoinHandle<()>>,
}

impl<K> DeadlineTimers<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
        }
    }

    /// Arms a timer: after `delay`, `message` is sent on `tx`. A send
    /// failure means the receiver is gone, which makes the deadline moot.
    pub fn schedule<M>(
        &mut self,
        key: K,
        delay: Duration,
        tx: mpsc::Sender<M>,
        message: M,
    ) where
        M: Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(message).await;
        });
        trace!(?key, ?delay, "deadline armed");
        if let Some(previous) = self.pending.insert(key, handle) {
            previous.abort();
        }
    }

    /// Disarms the timer for `key`, if one is pending. Returns whether a
    /// timer was actually cancelled.
    pub fn cancel(&mut self, key: &K) -> bool {
        match self.pending.remove(key) {
            Some(handle) => {
                handle.abort();
                trace!(?key, "deadline cancelled");
                true
            }
            None => false,
        }
    }

    /// Disarms every pending timer (room teardown, match end).
    pub fn cancel_all(&mut self) {
        for (_, handle) in self.pending.drain() {
            handle.abort();
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<K> Default for DeadlineTimers<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Drop for DeadlineTimers<K> {
    fn drop(&mut self) {
        for handle in self.pending.values() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    //! Time-dependent behavior is tested under tokio's paused clock:
    //! `start_paused = true` makes `sleep` resolve instantly once time is
    //! advanced, so these tests are fast and deterministic.

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_after_delay() {
        let (tx, mut rx) = mpsc::channel::<&'static str>(4);
        let mut timers = DeadlineTimers::new();
        timers.schedule(1u64, Duration::from_secs(30), tx, "expired");

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(rx.recv().await, Some("expired"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_fire() {
        let (tx, mut rx) = mpsc::channel::<&'static str>(4);
        let mut timers = DeadlineTimers::new();
        timers.schedule(1u64, Duration::from_secs(30), tx, "expired");
        assert!(timers.cancel(&1));

        tokio::time::advance(Duration::from_secs(60)).await;
        // Channel stays silent; the sender side was aborted.
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_pending_deadline() {
        let (tx, mut rx) = mpsc::channel::<u32>(4);
        let mut timers = DeadlineTimers::new();
        timers.schedule(1u64, Duration::from_secs(30), tx.clone(), 1);
        timers.schedule(1u64, Duration::from_secs(30), tx, 2);
        assert_eq!(timers.len(), 1);

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(rx.recv().await, Some(2));
        assert!(rx.try_recv().is_err(), "first deadline was replaced");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_unknown_key_is_noop() {
        let mut timers = DeadlineTimers::<u64>::new();
        assert!(!timers.cancel(&42));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_silences_every_timer() {
        let (tx, mut rx) = mpsc::channel::<u64>(4);
        let mut timers = DeadlineTimers::new();
        for key in 0..3u64 {
            timers.schedule(key, Duration::from_secs(10), tx.clone(), key);
        }
        timers.cancel_all();
        assert!(timers.is_empty());

        tokio::time::advance(Duration::from_secs(20)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fire_into_dropped_receiver_is_harmless() {
        let (tx, rx) = mpsc::channel::<u64>(4);
        drop(rx);
        let mut timers = DeadlineTimers::new();
        timers.schedule(1u64, Duration::from_millis(5), tx, 7);
        tokio::time::advance(Duration::from_millis(10)).await;
        // Nothing to assert beyond "no panic"; the send error is swallowed.
    }
}
