//! modgate API server binary.
//!
//! Configuration comes from the environment:
//! - `PORT` (default 3000)
//! - `MODGATE_MODERATORS` comma-separated moderator ids (default 22358445)
//! - `MODGATE_SWEEP_INTERVAL_SECS` (default 30)
//! - `MODGATE_DEBUG=1` forces debug logging; otherwise `RUST_LOG` applies

use anyhow::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging(debug_enabled())?;

    info!("modgate API starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    modgate_api::server::run_from_env().await
}

fn debug_enabled() -> bool {
    std::env::var("MODGATE_DEBUG")
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Initialize tracing subscriber for logging
fn init_logging(debug: bool) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter = if debug {
        EnvFilter::new("modgate_api=debug,modgate_core=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("modgate_api=info,modgate_core=info,tower_http=info")
        })
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_line_number(true))
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_fails_when_already_installed() {
        assert!(init_logging(false).is_ok());
        assert!(init_logging(true).is_err());
    }
}
