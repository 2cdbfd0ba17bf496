//! Axum-based HTTP API for the modgate moderation store.
//!
//! This crate provides:
//! - `POST /api/moderation/{ban,unban,mute,unmute}` - encoded, moderator-gated mutations
//! - `GET /api/moderation/{banlist,mutelist}` - encoded listings
//! - `GET /api/moderation/status/:userId` - encoded per-user status
//! - `GET /` and `GET /ping` - plain JSON descriptor and liveness
//!
//! Every documented endpoint answers HTTP 200; outcomes travel inside the
//! encoded `{result, data}` envelope.

#![warn(missing_docs)]

/// API server runtime and in-process app builder.
pub mod server;
pub mod sweeper;
