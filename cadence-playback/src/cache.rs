//! # Local Track Cache
//!
//! Persists completed streams so a replayed track needs no network activity.
//!
//! One file per track, named by the SHA-256 of the track id under the
//! configured cache directory; presence with non-zero size is the hit test.
//! Writes are atomic (temp file + rename) and idempotent. Cache failures are
//! reported to the caller and never block playback: a failed persist leaves
//! the in-memory buffer untouched, and a failed read degrades to a network
//! fetch.

use crate::config::CacheConfig;
use crate::error::{PlaybackError, Result};
use crate::stream_buffer::StreamBuffer;
use cadence_library::models::TrackId;
use sha2::{Digest, Sha256};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};

/// Filesystem-backed cache of completed track streams.
pub struct TrackCache {
    config: CacheConfig,
}

/// Aggregate cache usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached tracks.
    pub entries: usize,
    /// Total bytes on disk.
    pub total_bytes: u64,
}

impl TrackCache {
    /// Create a cache over the configured directory.
    pub fn new(config: CacheConfig) -> Self {
        Self { config }
    }

    /// Cache directory path.
    pub fn directory(&self) -> &Path {
        &self.config.directory
    }

    /// Validate the configuration and create the cache directory.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<()> {
        self.config.validate()?;
        fs::create_dir_all(&self.config.directory)
            .await
            .map_err(PlaybackError::Persist)?;
        info!(directory = %self.config.directory.display(), "track cache initialized");
        Ok(())
    }

    /// Deterministic on-disk path for a track id.
    pub fn entry_path(&self, track_id: &TrackId) -> PathBuf {
        let digest = Sha256::digest(track_id.as_str().as_bytes());
        self.config
            .directory
            .join(format!("{:x}.{}", digest, self.config.file_extension))
    }

    /// Fill `buffer` from a cached copy, if one exists.
    ///
    /// On a hit the buffer is filled synchronously and closed (the stream is
    /// complete), and `true` is returned; a missing or empty entry returns
    /// `false`. Disk errors other than absence are returned to the caller.
    #[instrument(skip(self, buffer), fields(track = %track_id))]
    pub async fn try_load(&self, track_id: &TrackId, buffer: &StreamBuffer) -> Result<bool> {
        let path = self.entry_path(track_id);
        let metadata = match fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(error) => return Err(PlaybackError::Persist(error)),
        };
        if metadata.len() == 0 {
            return Ok(false);
        }

        let bytes = fs::read(&path).await.map_err(PlaybackError::Persist)?;
        buffer.write(&bytes)?;
        buffer.close();
        debug!(bytes = bytes.len(), "filled buffer from cache");
        Ok(true)
    }

    /// Persist a completed stream.
    ///
    /// Atomic and idempotent: re-persisting the same completed content is
    /// safe, and a reader never observes a partially written entry.
    #[instrument(skip(self, data), fields(track = %track_id))]
    pub async fn persist(&self, track_id: &TrackId, data: &[u8]) -> Result<()> {
        let path = self.entry_path(track_id);
        let staging = path.with_extension("tmp");

        fs::write(&staging, data)
            .await
            .map_err(PlaybackError::Persist)?;
        fs::rename(&staging, &path)
            .await
            .map_err(PlaybackError::Persist)?;

        debug!(bytes = data.len(), "persisted track");
        Ok(())
    }

    /// Returns `true` if a non-empty cached copy exists.
    pub async fn contains(&self, track_id: &TrackId) -> bool {
        fs::metadata(self.entry_path(track_id))
            .await
            .map(|metadata| metadata.len() > 0)
            .unwrap_or(false)
    }

    /// Remove one cached track; absent entries are not an error.
    pub async fn remove(&self, track_id: &TrackId) -> Result<()> {
        match fs::remove_file(self.entry_path(track_id)).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(PlaybackError::Persist(error)),
        }
    }

    /// Remove every cached track.
    pub async fn clear(&self) -> Result<()> {
        let mut entries = match fs::read_dir(&self.config.directory).await {
            Ok(entries) => entries,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(error) => return Err(PlaybackError::Persist(error)),
        };

        while let Some(entry) = entries.next_entry().await.map_err(PlaybackError::Persist)? {
            if self.is_cache_entry(&entry.path()) {
                fs::remove_file(entry.path())
                    .await
                    .map_err(PlaybackError::Persist)?;
            }
        }
        Ok(())
    }

    /// Aggregate entry count and on-disk size.
    pub async fn stats(&self) -> Result<CacheStats> {
        let mut stats = CacheStats::default();
        let mut entries = match fs::read_dir(&self.config.directory).await {
            Ok(entries) => entries,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(stats),
            Err(error) => return Err(PlaybackError::Persist(error)),
        };

        while let Some(entry) = entries.next_entry().await.map_err(PlaybackError::Persist)? {
            if !self.is_cache_entry(&entry.path()) {
                continue;
            }
            let metadata = entry.metadata().await.map_err(PlaybackError::Persist)?;
            stats.entries += 1;
            stats.total_bytes += metadata.len();
        }
        Ok(stats)
    }

    fn is_cache_entry(&self, path: &Path) -> bool {
        path.extension()
            .map(|extension| extension == self.config.file_extension.as_str())
            .unwrap_or(false)
    }
}
