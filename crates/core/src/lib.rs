//! # modgate core
//!
//! The moderation state machine behind the modgate HTTP service.
//!
//! ## Features
//!
//! - **Records**: `BanRecord` and `MuteRecord`, one of each per user, latest write wins
//! - **Codec**: base64-wrapped JSON payloads and the `{result, data}` response envelope
//! - **Registry**: static set of moderator identities
//! - **Store**: in-memory ban/mute collections with lazy and swept mute expiry
//! - **Service**: authorization-gated ban, unban, mute, unmute and queries

#![warn(missing_docs)]

pub mod clock;
pub mod codec;
pub mod constants;
pub mod error;
pub mod registry;
pub mod service;
pub mod store;
pub mod types;

// Re-export commonly used items
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use codec::{decode, decode_as, encode, encode_envelope, CodecError, Envelope};
pub use constants::*;
pub use error::{ModerationError, Result};
pub use registry::ModeratorRegistry;
pub use service::ModerationService;
pub use store::ModerationStore;
pub use types::*;
