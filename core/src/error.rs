//! Error Types
//!
//! Typed errors for the fallible seams of the core: the chat backend and
//! configuration loading. Everything inside the animation path absorbs
//! errors locally and logs them instead of returning them.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the chat backend client
#[derive(Debug, Error)]
pub enum ChatError {
    /// The request did not complete within the configured timeout
    #[error("chat request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout in seconds
        timeout_secs: u64,
    },

    /// Transport-level failure (connection refused, DNS, TLS)
    #[error("chat transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered but the body was not the expected shape
    #[error("malformed chat response: {0}")]
    MalformedResponse(String),
}

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file
    #[error("failed to read config file at {path}: {source}")]
    Read {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),
}
