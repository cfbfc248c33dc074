//! # Playback Configuration
//!
//! Configuration types for the player controller and the local track cache.

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Local track cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding one file per cached track.
    ///
    /// Default: `<platform cache dir>/cadence` (falls back to the system
    /// temporary directory when the platform reports no cache dir).
    #[serde(default = "default_cache_directory")]
    pub directory: PathBuf,

    /// File extension for cache entries.
    ///
    /// Default: `audio`.
    #[serde(default = "default_file_extension")]
    pub file_extension: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: default_cache_directory(),
            file_extension: default_file_extension(),
        }
    }
}

impl CacheConfig {
    /// Override the cache directory.
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.directory.as_os_str().is_empty() {
            return Err(PlaybackError::Config(
                "cache directory must not be empty".to_string(),
            ));
        }
        if self.file_extension.is_empty() || self.file_extension.contains(['/', '\\', '.']) {
            return Err(PlaybackError::Config(format!(
                "invalid cache file extension '{}'",
                self.file_extension
            )));
        }
        Ok(())
    }
}

/// Player controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Number of upcoming tracks whose fetch is started ahead of playback.
    ///
    /// The active window is the current track plus this many peeked tracks;
    /// a larger window smooths gapless transitions at the cost of bandwidth.
    ///
    /// Default: 2.
    #[serde(default = "default_lookahead")]
    pub lookahead: usize,

    /// Local track cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            lookahead: default_lookahead(),
            cache: CacheConfig::default(),
        }
    }
}

impl PlayerConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.lookahead == 0 {
            return Err(PlaybackError::Config(
                "lookahead must be at least 1".to_string(),
            ));
        }
        self.cache.validate()
    }
}

fn default_cache_directory() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("cadence")
}

fn default_file_extension() -> String {
    "audio".to_string()
}

fn default_lookahead() -> usize {
    2
}
