//! In-memory moderation state.
//!
//! Two collections keyed by user id: bans and mutes. Each holds at most one
//! record per user and the latest write wins. Bans live until removed.
//! Mutes also disappear once expired: any read that observes an expired
//! mute deletes it, and [`ModerationStore::sweep_expired_mutes`] removes
//! the rest.
//!
//! Every method takes the relevant lock once for its whole body, so each
//! call is atomic with respect to every other call. Removing a key that is
//! already gone is a no-op.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::clock::{SharedClock, SystemClock};
use crate::types::{BanRecord, Millis, MuteRecord, StatusReport, UserId};

/// Shared handle to the ban and mute collections.
///
/// Cloning is cheap; clones operate on the same state.
#[derive(Clone)]
pub struct ModerationStore {
    bans: Arc<RwLock<HashMap<UserId, BanRecord>>>,
    mutes: Arc<RwLock<HashMap<UserId, MuteRecord>>>,
    clock: SharedClock,
}

impl ModerationStore {
    /// Create an empty store reading time from `clock`.
    pub fn new(clock: SharedClock) -> Self {
        Self {
            bans: Arc::new(RwLock::new(HashMap::new())),
            mutes: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    /// Current time according to the store's clock.
    pub fn now(&self) -> Millis {
        self.clock.now_millis()
    }

    /// Insert or replace the ban for `record.user_id`.
    ///
    /// Returns the replaced record, if any.
    pub async fn put_ban(&self, record: BanRecord) -> Option<BanRecord> {
        self.bans.write().await.insert(record.user_id, record)
    }

    /// Remove the ban for `user_id`, returning it if present.
    pub async fn remove_ban(&self, user_id: UserId) -> Option<BanRecord> {
        self.bans.write().await.remove(&user_id)
    }

    /// Insert or replace the mute for `record.user_id`.
    ///
    /// Returns the replaced record, if any.
    pub async fn put_mute(&self, record: MuteRecord) -> Option<MuteRecord> {
        self.mutes.write().await.insert(record.user_id, record)
    }

    /// Remove the mute for `user_id`, returning it if present.
    ///
    /// Expired records that no read or sweep has reached yet are still
    /// removed and returned.
    pub async fn remove_mute(&self, user_id: UserId) -> Option<MuteRecord> {
        self.mutes.write().await.remove(&user_id)
    }

    /// Every ban, in no particular order.
    pub async fn bans(&self) -> Vec<BanRecord> {
        self.bans.read().await.values().cloned().collect()
    }

    /// Every unexpired mute, in no particular order.
    ///
    /// Expired mutes seen during the scan are deleted.
    pub async fn active_mutes(&self) -> Vec<MuteRecord> {
        let now = self.now();
        let mut mutes = self.mutes.write().await;
        mutes.retain(|user_id, mute| {
            let keep = !mute.is_expired(now);
            if !keep {
                debug!(user_id, expires_at = mute.expires_at, "dropping expired mute on read");
            }
            keep
        });
        mutes.values().cloned().collect()
    }

    /// Ban and mute status of `user_id`.
    ///
    /// An expired mute is deleted and reported as not muted.
    pub async fn status(&self, user_id: UserId) -> StatusReport {
        let ban_info = self.bans.read().await.get(&user_id).cloned();

        let now = self.now();
        let mute_info = {
            let mut mutes = self.mutes.write().await;
            match mutes.get(&user_id).cloned() {
                Some(mute) if mute.is_expired(now) => {
                    debug!(user_id, expires_at = mute.expires_at, "dropping expired mute on status");
                    mutes.remove(&user_id);
                    None
                }
                other => other,
            }
        };

        StatusReport {
            user_id: Some(user_id),
            is_banned: ban_info.is_some(),
            is_muted: mute_info.is_some(),
            ban_info,
            mute_info,
        }
    }

    /// Remove every expired mute, returning the affected users.
    pub async fn sweep_expired_mutes(&self) -> Vec<UserId> {
        let now = self.now();
        let mut mutes = self.mutes.write().await;
        let expired: Vec<UserId> = mutes
            .values()
            .filter(|mute| mute.is_expired(now))
            .map(|mute| mute.user_id)
            .collect();
        for user_id in &expired {
            mutes.remove(user_id);
        }
        expired
    }

    /// Number of stored bans.
    pub async fn ban_count(&self) -> usize {
        self.bans.read().await.len()
    }

    /// Number of stored mutes, expired ones included.
    pub async fn mute_count(&self) -> usize {
        self.mutes.read().await.len()
    }
}

impl Default for ModerationStore {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}
