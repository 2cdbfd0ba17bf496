//! Canonical constants for the moderation service.
//!
//! These values are part of the client wire contract and MUST NOT change
//! without a coordinated client release.

/// Envelope `result` code carried by every encoded response.
pub const ENVELOPE_RESULT_OK: u8 = 1;

/// Placeholder stored when a ban or mute arrives without a reason.
pub const NO_REASON_PROVIDED: &str = "No reason provided";

/// Mute length applied when the request omits `duration` (seconds).
pub const DEFAULT_MUTE_DURATION_SECS: i64 = 60;

/// Period of the background expired-mute sweep (seconds).
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 30;

/// Listen port used when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 3000;

/// Moderator identities trusted when no registry override is configured.
pub const DEFAULT_MODERATORS: [i64; 1] = [22358445];

/// Milliseconds per second, for `duration` to `expires_at` conversion.
pub const MILLIS_PER_SEC: i64 = 1000;
