//! Domain models for the streamed music library
//!
//! These types mirror the media server's item metadata (PascalCase JSON
//! fields). They are immutable once constructed; a track does not own its
//! audio bytes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// =============================================================================
// ID Types
// =============================================================================

/// Unique identifier for a track.
///
/// Opaque string assigned by the media server; also the key for the local
/// audio cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TrackId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Unique identifier for an album.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlbumId(String);

impl AlbumId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlbumId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AlbumId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// =============================================================================
// Domain Models
// =============================================================================

/// One playable audio item with identifier and display metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Unique identifier
    #[serde(rename = "Id")]
    pub id: TrackId,
    /// Track title
    #[serde(rename = "Name")]
    pub title: String,
    /// Album title
    #[serde(rename = "Album", default)]
    pub album: String,
    /// Album artist
    #[serde(rename = "AlbumArtist", default)]
    pub artist: String,
    /// Server-reported runtime in 100ns ticks, when known
    #[serde(rename = "RunTimeTicks", default, skip_serializing_if = "Option::is_none")]
    pub runtime_ticks: Option<i64>,
}

impl Track {
    pub fn new(
        id: impl Into<TrackId>,
        title: impl Into<String>,
        album: impl Into<String>,
        artist: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            album: album.into(),
            artist: artist.into(),
            runtime_ticks: None,
        }
    }

    /// Runtime as a `Duration`, when the server reported one.
    pub fn runtime(&self) -> Option<Duration> {
        let ticks = self.runtime_ticks?;
        if ticks < 0 {
            return None;
        }
        Some(Duration::from_nanos(ticks as u64 * 100))
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist, self.title)
    }
}

/// Album metadata, used by hosts when building queues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    /// Unique identifier
    #[serde(rename = "Id")]
    pub id: AlbumId,
    /// Album title
    #[serde(rename = "Name")]
    pub title: String,
    /// Album artist
    #[serde(rename = "AlbumArtist", default)]
    pub artist: String,
}
