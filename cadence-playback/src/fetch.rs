//! # Fetch Scheduler
//!
//! Owns the active window of streams (current track plus lookahead) and the
//! background task that downloads each one.
//!
//! ## Behavior
//!
//! - `ensure_stream` is idempotent per track: at most one producer per
//!   buffer, never a double start.
//! - Cache-first: a cached copy fills the buffer synchronously and no fetch
//!   is scheduled.
//! - A fetch runs decoupled from playback: decode can begin pulling from the
//!   buffer while the tail is still downloading.
//! - Transport failure closes the buffer at the received length; the partial
//!   data stays playable and the track is not marked cached.
//! - Eviction (`retain`/`cancel_all`) cancels the task and discards the
//!   buffer; a late chunk hits the discarded buffer's write rejection and
//!   the task stops without touching memory it no longer owns.

use crate::cache::TrackCache;
use crate::stream_buffer::StreamBuffer;
use crate::traits::StreamSource;
use cadence_library::models::{Track, TrackId};
use futures_util::StreamExt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Schedules and tracks the in-flight streams of the active window.
pub struct FetchScheduler {
    source: Arc<dyn StreamSource>,
    cache: Arc<TrackCache>,
    active: Mutex<HashMap<TrackId, ActiveStream>>,
}

struct ActiveStream {
    buffer: StreamBuffer,
    cancel: CancellationToken,
}

impl FetchScheduler {
    pub fn new(source: Arc<dyn StreamSource>, cache: Arc<TrackCache>) -> Self {
        Self {
            source,
            cache,
            active: Mutex::new(HashMap::new()),
        }
    }

    /// Return the track's active stream, creating it if necessary.
    ///
    /// A new stream is reserved before any I/O so a concurrent call for the
    /// same track observes it and returns the same buffer. On a cache hit
    /// the buffer is filled and closed with no network activity; a cache
    /// read failure is logged and degrades to a normal fetch. Never blocks
    /// on the network: the fetch runs in a spawned task.
    pub async fn ensure_stream(&self, track: &Track) -> StreamBuffer {
        let (buffer, cancel) = {
            let mut active = self.active.lock();
            if let Some(existing) = active.get(&track.id) {
                return existing.buffer.clone();
            }
            let buffer = StreamBuffer::new();
            let cancel = CancellationToken::new();
            active.insert(
                track.id.clone(),
                ActiveStream {
                    buffer: buffer.clone(),
                    cancel: cancel.clone(),
                },
            );
            (buffer, cancel)
        };

        match self.cache.try_load(&track.id, &buffer).await {
            Ok(true) => {
                debug!(track = %track.id, "cache hit; no fetch scheduled");
                return buffer;
            }
            Ok(false) => {}
            Err(error) => {
                warn!(track = %track.id, %error, "cache read failed; falling back to network");
            }
        }

        let source = Arc::clone(&self.source);
        let cache = Arc::clone(&self.cache);
        let id = track.id.clone();
        let task_buffer = buffer.clone();
        tokio::spawn(async move {
            run_fetch(source, cache, id, task_buffer, cancel).await;
        });

        buffer
    }

    /// Active stream for a track, if any.
    pub fn get(&self, track_id: &TrackId) -> Option<StreamBuffer> {
        self.active
            .lock()
            .get(track_id)
            .map(|stream| stream.buffer.clone())
    }

    /// Track ids with an active stream.
    pub fn active_tracks(&self) -> Vec<TrackId> {
        self.active.lock().keys().cloned().collect()
    }

    /// Evict every stream whose track is not in `keep`: the fetch is
    /// cancelled and the buffer discarded, releasing any blocked reader with
    /// end-of-stream.
    pub fn retain(&self, keep: &[TrackId]) {
        let mut active = self.active.lock();
        active.retain(|id, stream| {
            if keep.contains(id) {
                true
            } else {
                debug!(track = %id, "evicting stream from active window");
                stream.cancel.cancel();
                stream.buffer.discard();
                false
            }
        });
    }

    /// Cancel and discard every active stream.
    pub fn cancel_all(&self) {
        self.retain(&[]);
    }
}

/// Drain the source's chunk stream into the buffer, then persist.
async fn run_fetch(
    source: Arc<dyn StreamSource>,
    cache: Arc<TrackCache>,
    id: TrackId,
    buffer: StreamBuffer,
    cancel: CancellationToken,
) {
    let mut stream = match source.fetch_stream(&id).await {
        Ok(stream) => stream,
        Err(error) => {
            warn!(track = %id, %error, "failed to open stream");
            buffer.close();
            return;
        }
    };

    let mut received = 0usize;
    loop {
        let chunk = tokio::select! {
            _ = cancel.cancelled() => {
                debug!(track = %id, received, "fetch cancelled");
                buffer.close();
                return;
            }
            chunk = stream.next() => chunk,
        };

        match chunk {
            Some(Ok(bytes)) => match buffer.write(&bytes) {
                Ok(written) => received += written,
                Err(_) => {
                    // Buffer was discarded by eviction; it is no longer ours.
                    debug!(track = %id, received, "buffer discarded; abandoning fetch");
                    return;
                }
            },
            Some(Err(error)) => {
                warn!(track = %id, received, %error, "transport error; stream truncated");
                buffer.close();
                return;
            }
            None => break,
        }
    }

    buffer.close();
    debug!(track = %id, received, "fetch complete");

    if let Err(error) = cache.persist(&id, &buffer.snapshot()).await {
        warn!(track = %id, %error, "failed to persist completed track");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use crate::error::{PlaybackError, Result};
    use crate::traits::ByteStream;
    use async_trait::async_trait;
    use bytes::Bytes;
    use futures::stream;
    use std::time::Duration;

    /// Deterministic source yielding pre-baked chunk results and recording
    /// which tracks were fetched.
    struct FakeSource {
        chunks: Vec<Result<Bytes>>,
        fetched: Mutex<Vec<TrackId>>,
    }

    impl FakeSource {
        fn new(chunks: Vec<Result<Bytes>>) -> Self {
            Self {
                chunks,
                fetched: Mutex::new(Vec::new()),
            }
        }

        fn fetched(&self) -> Vec<TrackId> {
            self.fetched.lock().clone()
        }
    }

    #[async_trait]
    impl StreamSource for FakeSource {
        async fn fetch_stream(&self, track_id: &TrackId) -> Result<ByteStream> {
            self.fetched.lock().push(track_id.clone());
            let chunks: Vec<Result<Bytes>> = self
                .chunks
                .iter()
                .map(|chunk| match chunk {
                    Ok(bytes) => Ok(bytes.clone()),
                    Err(_) => Err(PlaybackError::Transport("injected failure".to_string())),
                })
                .collect();
            Ok(stream::iter(chunks).boxed())
        }
    }

    fn scheduler_with(
        dir: &tempfile::TempDir,
        source: Arc<FakeSource>,
    ) -> (FetchScheduler, Arc<TrackCache>) {
        let cache = Arc::new(TrackCache::new(
            CacheConfig::default().with_directory(dir.path().join("cache")),
        ));
        (
            FetchScheduler::new(source, Arc::clone(&cache)),
            cache,
        )
    }

    async fn wait_closed(buffer: &StreamBuffer) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !buffer.is_closed() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("stream never closed");
    }

    fn track(id: &str) -> Track {
        Track::new(id, id.to_uppercase(), "Album", "Artist")
    }

    #[tokio::test]
    async fn fetch_fills_buffer_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::new(vec![
            Ok(Bytes::from_static(b"abc")),
            Ok(Bytes::from_static(b"defg")),
        ]));
        let (scheduler, cache) = scheduler_with(&dir, Arc::clone(&source));
        cache.initialize().await.unwrap();

        let buffer = scheduler.ensure_stream(&track("t1")).await;
        wait_closed(&buffer).await;

        assert_eq!(&buffer.read(16)[..], b"abcdefg");
        assert!(!buffer.is_discarded());

        // persistence happens after close; poll for it
        tokio::time::timeout(Duration::from_secs(5), async {
            while !cache.contains(&TrackId::new("t1")).await {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("track never persisted");
    }

    #[tokio::test]
    async fn ensure_stream_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::new(vec![Ok(Bytes::from_static(b"x"))]));
        let (scheduler, cache) = scheduler_with(&dir, Arc::clone(&source));
        cache.initialize().await.unwrap();

        let first = scheduler.ensure_stream(&track("t1")).await;
        wait_closed(&first).await;
        let second = scheduler.ensure_stream(&track("t1")).await;

        // same underlying stream, and only one fetch ever started
        assert_eq!(second.len(), first.len());
        assert_eq!(source.fetched().len(), 1);
        assert_eq!(scheduler.active_tracks().len(), 1);
    }

    #[tokio::test]
    async fn cache_hit_skips_the_network() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::new(vec![Ok(Bytes::from_static(b"net"))]));
        let (scheduler, cache) = scheduler_with(&dir, Arc::clone(&source));
        cache.initialize().await.unwrap();
        cache
            .persist(&TrackId::new("t1"), b"cached bytes")
            .await
            .unwrap();

        let buffer = scheduler.ensure_stream(&track("t1")).await;

        // filled synchronously from disk, closed, and no fetch recorded
        assert!(buffer.is_closed());
        assert_eq!(&buffer.read(32)[..], b"cached bytes");
        assert!(source.fetched().is_empty());
    }

    #[tokio::test]
    async fn transport_error_truncates_without_caching() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::new(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(PlaybackError::Transport("reset".to_string())),
        ]));
        let (scheduler, cache) = scheduler_with(&dir, Arc::clone(&source));
        cache.initialize().await.unwrap();

        let buffer = scheduler.ensure_stream(&track("t1")).await;
        wait_closed(&buffer).await;

        // the bytes that arrived stay playable
        assert_eq!(&buffer.read(32)[..], b"partial");
        assert!(buffer.read(32).is_empty());
        assert!(!cache.contains(&TrackId::new("t1")).await);
    }

    #[tokio::test]
    async fn retain_discards_evicted_streams() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::new(vec![Ok(Bytes::from_static(b"x"))]));
        let (scheduler, cache) = scheduler_with(&dir, Arc::clone(&source));
        cache.initialize().await.unwrap();

        let kept = scheduler.ensure_stream(&track("keep")).await;
        let evicted = scheduler.ensure_stream(&track("evict")).await;

        scheduler.retain(&[TrackId::new("keep")]);

        assert!(evicted.is_discarded());
        assert!(evicted.write(b"late chunk").is_err());
        assert!(!kept.is_discarded());
        assert_eq!(scheduler.active_tracks(), vec![TrackId::new("keep")]);

        scheduler.cancel_all();
        assert!(kept.is_discarded());
        assert!(scheduler.active_tracks().is_empty());
    }
}
