//! Diagnostic logging setup.
//!
//! Diagnostics go to stderr so `scrapedash show --format json` keeps a clean
//! stdout. `RUST_LOG` wins over the configured level.

use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::schema::LoggingConfig;

/// Install the global subscriber. `level_override` comes from the CLI.
pub fn init(cfg: &LoggingConfig, level_override: Option<&str>) -> Result<()> {
    let level = level_override.unwrap_or(cfg.level.as_str());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let layer = if cfg.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))
}
