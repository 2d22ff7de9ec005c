//! VPupper relay: real-time puppet pose data over HTTP.
//!
//! Usage:
//!   vpupper <PORT> [OPTIONS]
//!
//! A producer POSTs frames to `/puppet-data`; consumers GET the smoothed
//! frame from the same path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use vpupper_common::config::{config_file_path, AppConfig, MergeGranularity, SmoothingMode};
use vpupper_common::error::VpupperError;
use vpupper_processing_core::PuppetRelay;

mod server;

#[derive(Parser, Debug)]
#[command(
    name = "vpupper",
    about = "Relay and smooth real-time puppet pose data over HTTP",
    version,
    author
)]
struct Cli {
    /// Port to listen on
    #[arg(value_parser = clap::value_parser!(u16).range(1..))]
    port: u16,

    /// Address to bind (overrides config)
    #[arg(long)]
    bind: Option<String>,

    /// Directory served under /static (overrides config)
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Output mode: latest|average
    #[arg(long)]
    smoothing: Option<SmoothingMode>,

    /// Number of frames averaged in `average` mode
    #[arg(long)]
    window: Option<usize>,

    /// Fallback granularity for partial frames: section|leaf
    #[arg(long)]
    merge: Option<MergeGranularity>,

    /// Read configuration from this file instead of the standard location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit structured JSON logs
    #[arg(long)]
    json_logs: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Overlay command-line flags on a loaded configuration.
    fn apply(&self, config: &mut AppConfig) {
        if let Some(bind) = &self.bind {
            config.server.bind_address = bind.clone();
        }
        if let Some(dir) = &self.static_dir {
            config.server.static_dir = dir.clone();
        }
        if let Some(mode) = self.smoothing {
            config.smoothing.mode = mode;
        }
        if let Some(window) = self.window {
            config.smoothing.window = window;
        }
        if let Some(merge) = self.merge {
            config.smoothing.merge = merge;
        }
        if self.json_logs {
            config.logging.json = true;
        }
        if self.verbose {
            config.logging.level = "debug".to_string();
        }
    }
}

/// Result of reading the configuration before logging is up.
struct LoadedConfig {
    config: AppConfig,
    /// Set when the standard config file was present but unusable and the
    /// defaults were used instead. Logged once the subscriber is installed.
    fallback: Option<VpupperError>,
}

/// Read the explicit config file strictly, or the standard one leniently.
fn load_config(explicit: Option<&Path>, standard: &Path) -> anyhow::Result<LoadedConfig> {
    match explicit {
        Some(path) => {
            let config = AppConfig::load_from(path)
                .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display()))?;
            Ok(LoadedConfig {
                config,
                fallback: None,
            })
        }
        None => Ok(match AppConfig::load_optional(standard) {
            Ok(config) => LoadedConfig {
                config,
                fallback: None,
            },
            Err(e) => LoadedConfig {
                config: AppConfig::default(),
                fallback: Some(e),
            },
        }),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let LoadedConfig {
        mut config,
        fallback,
    } = load_config(cli.config.as_deref(), &config_file_path())?;
    cli.apply(&mut config);

    vpupper_common::logging::init_logging(&config.logging)?;
    if let Some(e) = fallback {
        tracing::warn!(error = %e, "Failed to load config file; using defaults");
    }

    let relay = Arc::new(PuppetRelay::new(&config.smoothing)?);
    tracing::info!(
        mode = %relay.mode(),
        window = config.smoothing.window,
        merge = %relay.merge_granularity(),
        "Relay seeded with default frame"
    );

    server::serve(&config.server, cli.port, relay).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_is_required() {
        assert!(Cli::try_parse_from(["vpupper"]).is_err());
    }

    #[test]
    fn test_port_must_be_positive() {
        assert!(Cli::try_parse_from(["vpupper", "0"]).is_err());
        assert!(Cli::try_parse_from(["vpupper", "-3"]).is_err());
        assert!(Cli::try_parse_from(["vpupper", "eighty"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "vpupper",
            "8080",
            "--smoothing",
            "average",
            "--window",
            "6",
            "--merge",
            "leaf",
            "--bind",
            "127.0.0.1",
            "--static-dir",
            "/srv/client",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.port, 8080);

        let mut config = AppConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.smoothing.mode, SmoothingMode::Average);
        assert_eq!(config.smoothing.window, 6);
        assert_eq!(config.smoothing.merge, MergeGranularity::Leaf);
        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert_eq!(config.server.static_dir, PathBuf::from("/srv/client"));
        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_unset_flags_keep_config() {
        let cli = Cli::try_parse_from(["vpupper", "3000"]).unwrap();
        let mut config = AppConfig::default();
        config.smoothing.window = 9;
        cli.apply(&mut config);
        assert_eq!(config.smoothing.window, 9);
        assert_eq!(config.smoothing.mode, SmoothingMode::Latest);
    }

    #[test]
    fn test_unknown_mode_rejected() {
        assert!(Cli::try_parse_from(["vpupper", "8080", "--smoothing", "median"]).is_err());
    }

    #[test]
    fn test_zero_window_accepted_in_latest_mode() {
        let cli = Cli::try_parse_from(["vpupper", "8080", "--window", "0"]).unwrap();
        let mut config = AppConfig::default();
        cli.apply(&mut config);
        assert!(PuppetRelay::new(&config.smoothing).is_ok());

        config.smoothing.mode = SmoothingMode::Average;
        assert!(PuppetRelay::new(&config.smoothing).is_err());
    }

    #[test]
    fn test_malformed_standard_config_is_kept_for_logging() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "smoothing": { "mode": "averag" }"#).unwrap();

        let loaded = load_config(None, &path).unwrap();
        assert_eq!(loaded.config.smoothing.mode, SmoothingMode::Latest);
        assert!(matches!(loaded.fallback, Some(VpupperError::Json(_))));
    }

    #[test]
    fn test_valid_standard_config_has_no_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "smoothing": { "mode": "average" } }"#).unwrap();

        let loaded = load_config(None, &path).unwrap();
        assert_eq!(loaded.config.smoothing.mode, SmoothingMode::Average);
        assert!(loaded.fallback.is_none());
    }

    #[test]
    fn test_explicit_config_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let standard = dir.path().join("config.json");
        assert!(load_config(Some(&path), &standard).is_err());
    }
}
