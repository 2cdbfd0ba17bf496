//! Core types for the moderation service.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MUTE_DURATION_SECS, MILLIS_PER_SEC, NO_REASON_PROVIDED};
use crate::error::ModerationError;

/// Numeric user identity as used by the game client.
pub type UserId = i64;

/// Epoch milliseconds.
pub type Millis = i64;

/// A ban on a user. Bans never expire on their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanRecord {
    /// Banned user.
    pub user_id: UserId,
    /// Moderator who issued the ban.
    pub moderator_id: UserId,
    /// Free-form reason shown to the user.
    pub reason: String,
    /// When the ban was issued (epoch ms).
    pub timestamp: Millis,
}

impl BanRecord {
    /// Build a ban from a request, filling `reason` and `timestamp` defaults.
    pub fn from_request(req: &ModerationRequest, now: Millis) -> Self {
        Self {
            user_id: req.user_id,
            moderator_id: req.moderator_id,
            reason: req.reason_or_default(),
            timestamp: req.timestamp_or(now),
        }
    }
}

/// A temporary mute on a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuteRecord {
    /// Muted user.
    pub user_id: UserId,
    /// Moderator who issued the mute.
    pub moderator_id: UserId,
    /// Requested mute length in seconds.
    pub duration: i64,
    /// Free-form reason shown to the user.
    pub reason: String,
    /// When the mute was issued (epoch ms).
    pub timestamp: Millis,
    /// When the mute stops applying (epoch ms).
    pub expires_at: Millis,
}

impl MuteRecord {
    /// Build a mute from a request.
    ///
    /// A caller-supplied `expires_at` is stored as-is, even if it disagrees
    /// with `duration`. Otherwise it is `timestamp + duration * 1000`.
    pub fn from_request(req: &ModerationRequest, now: Millis) -> Self {
        let duration = match req.duration {
            Some(d) if d != 0 => d,
            _ => DEFAULT_MUTE_DURATION_SECS,
        };
        let timestamp = req.timestamp_or(now);
        let expires_at = match req.expires_at {
            Some(at) if at != 0 => at,
            _ => timestamp.saturating_add(duration.saturating_mul(MILLIS_PER_SEC)),
        };

        Self {
            user_id: req.user_id,
            moderator_id: req.moderator_id,
            duration,
            reason: req.reason_or_default(),
            timestamp,
            expires_at,
        }
    }

    /// Whether the mute no longer applies at `now`.
    pub const fn is_expired(&self, now: Millis) -> bool {
        self.expires_at <= now
    }
}

/// Decoded payload of a mutating request.
///
/// Unknown fields are ignored; optional fields accept `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationRequest {
    /// Target user.
    pub user_id: UserId,
    /// Acting moderator, checked against the registry.
    pub moderator_id: UserId,
    /// Optional reason; empty means unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Mute length in seconds; zero means unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    /// Issue time (epoch ms); zero means unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Millis>,
    /// Explicit mute expiry (epoch ms); zero means unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Millis>,
}

impl ModerationRequest {
    /// Minimal request targeting `user_id` on behalf of `moderator_id`.
    pub fn new(user_id: UserId, moderator_id: UserId) -> Self {
        Self {
            user_id,
            moderator_id,
            reason: None,
            duration: None,
            timestamp: None,
            expires_at: None,
        }
    }

    /// Set the reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Set the mute duration in seconds.
    pub fn with_duration(mut self, duration: i64) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Set the issue timestamp.
    pub fn with_timestamp(mut self, timestamp: Millis) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Set an explicit expiry.
    pub fn with_expires_at(mut self, expires_at: Millis) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    // Empty strings and zero are treated as absent, matching the client's
    // falsy-means-unset convention.
    fn reason_or_default(&self) -> String {
        match self.reason.as_deref() {
            Some(r) if !r.is_empty() => r.to_string(),
            _ => NO_REASON_PROVIDED.to_string(),
        }
    }

    fn timestamp_or(&self, now: Millis) -> Millis {
        match self.timestamp {
            Some(ts) if ts != 0 => ts,
            _ => now,
        }
    }
}

/// In-band result of a mutating operation.
///
/// Serializes as `{success: true, user_id}` or `{success: false, error}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResponse {
    /// Whether the operation took effect.
    pub success: bool,
    /// Target user, on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    /// Failure message, on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OperationResponse {
    /// Successful operation on `user_id`.
    pub fn ok(user_id: UserId) -> Self {
        Self {
            success: true,
            user_id: Some(user_id),
            error: None,
        }
    }

    /// Failed operation.
    pub fn failed(err: ModerationError) -> Self {
        Self {
            success: false,
            user_id: None,
            error: Some(err.to_string()),
        }
    }
}

impl From<Result<UserId, ModerationError>> for OperationResponse {
    fn from(result: Result<UserId, ModerationError>) -> Self {
        match result {
            Ok(user_id) => Self::ok(user_id),
            Err(err) => Self::failed(err),
        }
    }
}

/// Moderation status of a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    /// Queried user; `None` when the requested id is not a number.
    pub user_id: Option<UserId>,
    /// A ban record exists.
    pub is_banned: bool,
    /// An unexpired mute record exists.
    pub is_muted: bool,
    /// The ban record, if banned.
    pub ban_info: Option<BanRecord>,
    /// The mute record, if muted.
    pub mute_info: Option<MuteRecord>,
}

impl StatusReport {
    /// Report for an id that matches no user: nothing banned, nothing muted.
    pub fn unknown_user() -> Self {
        Self {
            user_id: None,
            is_banned: false,
            is_muted: false,
            ban_info: None,
            mute_info: None,
        }
    }
}

/// Payload of the ban list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BanList {
    /// Every current ban.
    pub bans: Vec<BanRecord>,
}

/// Payload of the mute list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MuteList {
    /// Every unexpired mute.
    pub mutes: Vec<MuteRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ban_defaults() {
        let ban = BanRecord::from_request(&ModerationRequest::new(5, 1), 1_000);
        assert_eq!(ban.reason, NO_REASON_PROVIDED);
        assert_eq!(ban.timestamp, 1_000);

        let ban = BanRecord::from_request(
            &ModerationRequest::new(5, 1)
                .with_reason("")
                .with_timestamp(0),
            2_000,
        );
        assert_eq!(ban.reason, NO_REASON_PROVIDED);
        assert_eq!(ban.timestamp, 2_000);
    }

    #[test]
    fn test_mute_defaults_derive_expiry_from_timestamp() {
        let mute = MuteRecord::from_request(&ModerationRequest::new(5, 1), 10_000);
        assert_eq!(mute.duration, DEFAULT_MUTE_DURATION_SECS);
        assert_eq!(mute.expires_at, 10_000 + 60_000);

        let mute = MuteRecord::from_request(
            &ModerationRequest::new(5, 1)
                .with_duration(5)
                .with_timestamp(500),
            10_000,
        );
        assert_eq!(mute.timestamp, 500);
        assert_eq!(mute.expires_at, 5_500);
    }

    #[test]
    fn test_mute_trusts_supplied_expiry() {
        // duration says 60s but the caller's expiry wins
        let mute = MuteRecord::from_request(
            &ModerationRequest::new(5, 1)
                .with_duration(60)
                .with_expires_at(3),
            10_000,
        );
        assert_eq!(mute.duration, 60);
        assert_eq!(mute.expires_at, 3);
        assert!(mute.is_expired(10_000));
    }

    #[test]
    fn test_mute_expiry_boundary() {
        let mute = MuteRecord::from_request(
            &ModerationRequest::new(5, 1).with_expires_at(100),
            0,
        );
        assert!(!mute.is_expired(99));
        assert!(mute.is_expired(100));
    }

    #[test]
    fn test_request_ignores_unknown_fields_and_accepts_null() {
        let req: ModerationRequest = serde_json::from_value(serde_json::json!({
            "user_id": 9,
            "moderator_id": 22358445,
            "reason": null,
            "client_version": "1.2.3"
        }))
        .unwrap();
        assert_eq!(req, ModerationRequest::new(9, 22358445));
    }

    #[test]
    fn test_request_requires_ids() {
        let missing = serde_json::from_value::<ModerationRequest>(serde_json::json!({
            "moderator_id": 1
        }));
        assert!(missing.is_err());

        let wrong_type = serde_json::from_value::<ModerationRequest>(serde_json::json!({
            "user_id": "abc",
            "moderator_id": 1
        }));
        assert!(wrong_type.is_err());
    }

    #[test]
    fn test_request_rejects_fractional_numbers() {
        let fractional = serde_json::from_value::<ModerationRequest>(serde_json::json!({
            "user_id": 7,
            "moderator_id": 1,
            "duration": 1.5
        }));
        assert!(fractional.is_err());
    }

    #[test]
    fn test_operation_response_shape() {
        let ok = serde_json::to_value(OperationResponse::ok(999)).unwrap();
        assert_eq!(ok, serde_json::json!({"success": true, "user_id": 999}));

        let err =
            serde_json::to_value(OperationResponse::failed(ModerationError::NotBanned)).unwrap();
        assert_eq!(
            err,
            serde_json::json!({"success": false, "error": "User not banned"})
        );
    }

    #[test]
    fn test_status_report_serializes_nulls() {
        let report = StatusReport {
            user_id: Some(1),
            is_banned: false,
            is_muted: false,
            ban_info: None,
            mute_info: None,
        };
        let json = serde_json::to_value(report).unwrap();
        assert!(json["ban_info"].is_null());
        assert!(json["mute_info"].is_null());
    }

    #[test]
    fn test_unknown_user_report_has_null_id() {
        let json = serde_json::to_value(StatusReport::unknown_user()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "user_id": null,
                "is_banned": false,
                "is_muted": false,
                "ban_info": null,
                "mute_info": null
            })
        );
    }
}
