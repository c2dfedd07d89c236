//! TOML Configuration
//!
//! Configuration loading for Otto, from `~/.config/otto/otto.toml`
//! (XDG base directory) with defaults for everything. Missing file means
//! defaults; a malformed file is an error the binary reports and exits on.
//!
//! # Example Configuration
//!
//! ```toml
//! wake_word = "hey otto"
//!
//! [backend]
//! url = "http://localhost:11434/v1/chat/completions"
//! model = "llama3.2"
//! timeout_secs = 30
//!
//! [face]
//! target_fps = 60
//! caption_fade_secs = 15
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OttoConfig {
    /// Phrase that wakes the assistant
    pub wake_word: String,
    /// Chat backend settings
    pub backend: BackendConfig,
    /// Face/render settings
    pub face: FaceConfig,
}

/// Chat backend settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    /// OpenAI-compatible chat completions endpoint
    pub url: String,
    /// Model identifier
    pub model: String,
    /// Hard cap on a single chat request; the voice loop must never hang
    pub timeout_secs: u64,
}

/// Face/render settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FaceConfig {
    /// Animation tick rate
    pub target_fps: u32,
    /// How long captions stay on screen before fading out
    pub caption_fade_secs: u64,
}

impl Default for OttoConfig {
    fn default() -> Self {
        Self {
            wake_word: "hey otto".to_string(),
            backend: BackendConfig::default(),
            face: FaceConfig::default(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434/v1/chat/completions".to_string(),
            model: "llama3.2".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            caption_fade_secs: 15,
        }
    }
}

impl OttoConfig {
    /// Default config file path (`$XDG_CONFIG_HOME/otto/otto.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("otto").join("otto.toml"))
    }

    /// Load from the default path, falling back to defaults when the file
    /// does not exist. A present-but-broken file is an error.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load from an explicit path
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&raw)?)
    }
}
