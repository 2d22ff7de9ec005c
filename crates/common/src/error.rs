//! Error types shared across VPupper crates.

use std::path::PathBuf;

/// Top-level error type for VPupper operations.
#[derive(Debug, thiserror::Error)]
pub enum VpupperError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Server error: {message}")]
    Server { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using VpupperError.
pub type VpupperResult<T> = Result<T, VpupperError>;

impl VpupperError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn server(msg: impl Into<String>) -> Self {
        Self::Server {
            message: msg.into(),
        }
    }
}
