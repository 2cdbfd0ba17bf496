//! Error types for the moderation core.

use thiserror::Error;

/// Outcome of a moderation operation that did not succeed.
///
/// The `Display` text of each variant is exactly the `error` string sent
/// back to clients inside the response envelope.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationError {
    /// Payload could not be decoded into a moderation request.
    #[error("Invalid data")]
    InvalidData,

    /// Caller's `moderator_id` is not in the registry.
    #[error("Unauthorized")]
    Unauthorized,

    /// Unban target has no ban record.
    #[error("User not banned")]
    NotBanned,

    /// Unmute target has no mute record.
    #[error("User not muted")]
    NotMuted,
}

/// Result type alias for ModerationError.
pub type Result<T> = std::result::Result<T, ModerationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_messages() {
        assert_eq!(ModerationError::InvalidData.to_string(), "Invalid data");
        assert_eq!(ModerationError::Unauthorized.to_string(), "Unauthorized");
        assert_eq!(ModerationError::NotBanned.to_string(), "User not banned");
        assert_eq!(ModerationError::NotMuted.to_string(), "User not muted");
    }
}
