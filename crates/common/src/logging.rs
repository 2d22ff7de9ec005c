//! Tracing subscriber setup for the relay binary.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::{VpupperError, VpupperResult};

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`. A level string that is
/// not a valid filter is rejected instead of silently logging nothing.
pub fn init_logging(config: &LoggingConfig) -> VpupperResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => level_filter(&config.level)?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = if config.json {
        builder.json().with_current_span(false).try_init()
    } else {
        builder.with_thread_ids(false).try_init()
    };
    installed.map_err(|e| VpupperError::config(format!("failed to install tracing subscriber: {e}")))
}

/// Parse a configured level string such as `info` or `vpupper=debug,warn`.
pub fn level_filter(level: &str) -> VpupperResult<EnvFilter> {
    EnvFilter::try_new(level)
        .map_err(|e| VpupperError::config(format!("invalid log level '{level}': {e}")))
}
