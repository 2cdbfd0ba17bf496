//! Background removal of expired mutes.
//!
//! Reads already drop expired mutes they touch; the sweeper catches the ones
//! nobody reads. Both paths may race on the same key, which the store treats
//! as a no-op.

use std::time::Duration;

use modgate_core::{ModerationStore, UserId};
use tracing::{debug, info};

/// Periodic sweeper that removes expired mutes at a fixed interval.
#[derive(Clone)]
pub struct PeriodicMuteSweeper {
    store: ModerationStore,
    interval: Duration,
}

impl PeriodicMuteSweeper {
    /// Create a sweeper over `store`.
    ///
    /// A zero interval is raised to one millisecond.
    pub fn new(store: ModerationStore, interval: Duration) -> Self {
        Self {
            store,
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    /// Run the sweep loop forever. Spawn it as a background task.
    pub async fn run(&self) {
        info!("Mute sweeper starting with interval: {:?}", self.interval);

        let mut interval = tokio::time::interval(self.interval);
        interval.tick().await; // First tick completes immediately, skip it

        loop {
            interval.tick().await;
            self.sweep_now().await;
        }
    }

    /// Sweep once, returning the users whose mutes were removed.
    pub async fn sweep_now(&self) -> Vec<UserId> {
        let expired = self.store.sweep_expired_mutes().await;
        for user_id in &expired {
            info!(user_id, "mute expired");
        }
        debug!(removed = expired.len(), "mute sweep finished");
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modgate_core::{ManualClock, ModerationRequest, MuteRecord};
    use std::sync::Arc;

    fn store_on(clock: &ManualClock) -> ModerationStore {
        ModerationStore::new(Arc::new(clock.clone()))
    }

    async fn mute(store: &ModerationStore, user_id: UserId, expires_at: i64) {
        store
            .put_mute(MuteRecord::from_request(
                &ModerationRequest::new(user_id, 22358445).with_expires_at(expires_at),
                0,
            ))
            .await;
    }

    #[tokio::test]
    async fn test_sweep_now_removes_expired_only() {
        let clock = ManualClock::new(1_000);
        let store = store_on(&clock);
        mute(&store, 1, 500).await;
        mute(&store, 2, 5_000).await;

        let sweeper = PeriodicMuteSweeper::new(store.clone(), Duration::from_secs(30));
        assert_eq!(sweeper.sweep_now().await, vec![1]);
        assert_eq!(store.mute_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_sweeps_without_reads() {
        let clock = ManualClock::new(0);
        let store = store_on(&clock);
        mute(&store, 42, 1_000).await;

        let sweeper = PeriodicMuteSweeper::new(store.clone(), Duration::from_secs(30));
        let handle = tokio::spawn(async move { sweeper.run().await });

        clock.set(2_000);
        // nothing happens before the first full interval
        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(store.mute_count().await, 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(store.mute_count().await, 0);

        handle.abort();
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let sweeper = PeriodicMuteSweeper::new(ModerationStore::default(), Duration::ZERO);
        assert_eq!(sweeper.interval, Duration::from_millis(1));
    }
}
