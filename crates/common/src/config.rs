//! Application configuration.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{VpupperError, VpupperResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,

    /// Frame smoothing and merge behavior.
    pub smoothing: SmoothingConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// HTTP listener settings. The port always comes from the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the relay binds to.
    pub bind_address: String,

    /// Directory served under `/static` (the consumer client).
    pub static_dir: PathBuf,
}

/// How incoming frames are turned into the published output frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingMode {
    /// Adopt the newest merged frame and recompute derived fields.
    #[default]
    Latest,
    /// Average every smoothed field across a window of recent frames.
    Average,
}

/// Granularity of the fallback applied to partial producer payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeGranularity {
    /// Omitted top-level sections are copied from the last complete frame.
    /// Leaves missing inside a supplied section take the default frame's value.
    #[default]
    Section,
    /// Every missing leaf is copied from the last complete frame.
    Leaf,
}

/// Frame smoothing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Output computation mode.
    pub mode: SmoothingMode,

    /// Number of frames retained for [`SmoothingMode::Average`].
    pub window: usize,

    /// Fallback granularity for partial frames.
    pub merge: MergeGranularity,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "vpupper=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

/// Window capacity used when nothing else is configured.
pub const DEFAULT_WINDOW: usize = 4;

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            static_dir: PathBuf::from("static"),
        }
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            mode: SmoothingMode::default(),
            window: DEFAULT_WINDOW,
            merge: MergeGranularity::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl SmoothingConfig {
    /// Reject settings the frame store cannot honor. The window is only
    /// checked in [`SmoothingMode::Average`]; `Latest` never reads it.
    pub fn validate(&self) -> VpupperResult<()> {
        if self.mode == SmoothingMode::Average && self.window == 0 {
            return Err(VpupperError::config(
                "smoothing window must hold at least one frame",
            ));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Like [`AppConfig::load_from`], but a missing file yields the defaults.
    ///
    /// Used for [`config_file_path`]. A file that exists but cannot be read
    /// or parsed is still an error; the caller decides whether to fall back
    /// and reports it once logging is up.
    pub fn load_optional(path: &Path) -> VpupperResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(path)
    }

    /// Load config from an explicit path. Unlike [`AppConfig::load`], any
    /// failure is reported to the caller.
    pub fn load_from(path: &Path) -> VpupperResult<Self> {
        if !path.exists() {
            return Err(VpupperError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl fmt::Display for SmoothingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SmoothingMode::Latest => f.write_str("latest"),
            SmoothingMode::Average => f.write_str("average"),
        }
    }
}

impl FromStr for SmoothingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latest" => Ok(SmoothingMode::Latest),
            "average" => Ok(SmoothingMode::Average),
            other => Err(format!(
                "unknown smoothing mode '{other}' (expected latest|average)"
            )),
        }
    }
}

impl fmt::Display for MergeGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeGranularity::Section => f.write_str("section"),
            MergeGranularity::Leaf => f.write_str("leaf"),
        }
    }
}

impl FromStr for MergeGranularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "section" => Ok(MergeGranularity::Section),
            "leaf" => Ok(MergeGranularity::Leaf),
            other => Err(format!(
                "unknown merge granularity '{other}' (expected section|leaf)"
            )),
        }
    }
}

/// Standard config file location: `$XDG_CONFIG_HOME/vpupper/config.json`.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("vpupper").join("config.json")
}
