//! # Playback Error Types
//!
//! Error taxonomy for the streaming playback core.

use thiserror::Error;

/// Errors that can occur during streaming and playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Buffer Errors
    // ========================================================================
    /// A write payload was rejected because the buffer can no longer accept
    /// it (the stream was closed or the buffer discarded).
    #[error("Invalid write: {0}")]
    InvalidInput(String),

    /// A seek resolved to a negative position.
    #[error("Invalid seek to negative position {position}")]
    InvalidSeek { position: i64 },

    // ========================================================================
    // Streaming Errors
    // ========================================================================
    /// Network fetch failed; any bytes received so far remain playable.
    #[error("Transport error: {0}")]
    Transport(String),

    // ========================================================================
    // Cache Errors
    // ========================================================================
    /// Disk I/O failure while reading or writing the local track cache.
    #[error("Cache persistence error: {0}")]
    Persist(#[source] std::io::Error),

    // ========================================================================
    // Queue Errors
    // ========================================================================
    /// A playback command was issued with no tracks present.
    #[error("Queue is empty")]
    EmptyQueue,

    /// A jump targeted an index outside the queue.
    #[error("Queue index {index} out of range (queue length {len})")]
    InvalidIndex { index: usize, len: usize },

    // ========================================================================
    // Configuration
    // ========================================================================
    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PlaybackError {
    /// Returns `true` if this error is transient and the operation can be
    /// retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, PlaybackError::Transport(_))
    }
}

#[cfg(feature = "http-streaming")]
impl From<reqwest::Error> for PlaybackError {
    fn from(error: reqwest::Error) -> Self {
        PlaybackError::Transport(error.to_string())
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_is_transient() {
        assert!(PlaybackError::Transport("connection reset".into()).is_transient());
        assert!(!PlaybackError::EmptyQueue.is_transient());
        assert!(!PlaybackError::InvalidSeek { position: -3 }.is_transient());
    }

    #[test]
    fn display_messages() {
        let error = PlaybackError::InvalidIndex { index: 7, len: 3 };
        assert_eq!(
            error.to_string(),
            "Queue index 7 out of range (queue length 3)"
        );
        assert_eq!(PlaybackError::EmptyQueue.to_string(), "Queue is empty");
    }
}
