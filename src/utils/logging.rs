//! Structured logging setup.
//!
//! Configures the `tracing` ecosystem for the service, supporting a
//! human-readable format for development and JSON for production log
//! ingestion. Log levels come from `RUST_LOG` when set, falling back to
//! the configured level.

use crate::config::LoggingConfig;
use crate::error::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the global tracing subscriber.
///
/// Supports two output formats:
/// - `json`: structured JSON logs for production ingestion.
/// - `pretty` (default): human-readable, colorized output.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
