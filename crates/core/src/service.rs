//! Authorized moderation operations.
//!
//! [`ModerationService`] pairs the moderator registry with the store. Every
//! mutating operation checks the acting moderator before touching state, and
//! an unauthorized call reveals nothing about the target user.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{ModerationError, Result};
use crate::registry::ModeratorRegistry;
use crate::store::ModerationStore;
use crate::types::{BanRecord, ModerationRequest, MuteRecord, StatusReport, UserId};

/// Moderation state plus the identities allowed to change it.
#[derive(Clone)]
pub struct ModerationService {
    registry: Arc<ModeratorRegistry>,
    store: ModerationStore,
}

impl ModerationService {
    /// Create a service over an existing registry and store.
    pub fn new(registry: ModeratorRegistry, store: ModerationStore) -> Self {
        Self {
            registry: Arc::new(registry),
            store,
        }
    }

    /// The moderator registry.
    pub fn registry(&self) -> &ModeratorRegistry {
        &self.registry
    }

    /// The underlying store, shared with the background sweeper.
    pub fn store(&self) -> &ModerationStore {
        &self.store
    }

    fn authorize(&self, req: &ModerationRequest) -> Result<()> {
        if self.registry.is_moderator(req.moderator_id) {
            Ok(())
        } else {
            warn!(moderator_id = req.moderator_id, "unauthorized moderator");
            Err(ModerationError::Unauthorized)
        }
    }

    /// Ban (or re-ban) `req.user_id`.
    pub async fn ban(&self, req: &ModerationRequest) -> Result<UserId> {
        self.authorize(req)?;

        let record = BanRecord::from_request(req, self.store.now());
        info!(
            user_id = record.user_id,
            moderator_id = record.moderator_id,
            reason = %record.reason,
            "user banned"
        );
        self.store.put_ban(record).await;
        Ok(req.user_id)
    }

    /// Lift the ban on `req.user_id`.
    pub async fn unban(&self, req: &ModerationRequest) -> Result<UserId> {
        self.authorize(req)?;

        match self.store.remove_ban(req.user_id).await {
            Some(_) => {
                info!(user_id = req.user_id, moderator_id = req.moderator_id, "user unbanned");
                Ok(req.user_id)
            }
            None => {
                info!(user_id = req.user_id, "unban requested for user that is not banned");
                Err(ModerationError::NotBanned)
            }
        }
    }

    /// Mute (or re-mute) `req.user_id`.
    pub async fn mute(&self, req: &ModerationRequest) -> Result<UserId> {
        self.authorize(req)?;

        let record = MuteRecord::from_request(req, self.store.now());
        info!(
            user_id = record.user_id,
            moderator_id = record.moderator_id,
            duration = record.duration,
            expires_at = record.expires_at,
            reason = %record.reason,
            "user muted"
        );
        self.store.put_mute(record).await;
        Ok(req.user_id)
    }

    /// Lift the mute on `req.user_id`.
    pub async fn unmute(&self, req: &ModerationRequest) -> Result<UserId> {
        self.authorize(req)?;

        match self.store.remove_mute(req.user_id).await {
            Some(_) => {
                info!(user_id = req.user_id, moderator_id = req.moderator_id, "user unmuted");
                Ok(req.user_id)
            }
            None => {
                info!(user_id = req.user_id, "unmute requested for user that is not muted");
                Err(ModerationError::NotMuted)
            }
        }
    }

    /// All bans.
    pub async fn list_bans(&self) -> Vec<BanRecord> {
        let bans = self.store.bans().await;
        info!(count = bans.len(), "listing bans");
        bans
    }

    /// All unexpired mutes; expired ones are deleted on the way.
    pub async fn list_mutes(&self) -> Vec<MuteRecord> {
        let mutes = self.store.active_mutes().await;
        info!(count = mutes.len(), "listing active mutes");
        mutes
    }

    /// Ban and mute status of `user_id`.
    pub async fn status(&self, user_id: UserId) -> StatusReport {
        let report = self.store.status(user_id).await;
        info!(
            user_id,
            is_banned = report.is_banned,
            is_muted = report.is_muted,
            "status lookup"
        );
        report
    }
}
