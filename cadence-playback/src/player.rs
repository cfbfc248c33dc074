//! # Player Controller
//!
//! The queue controller: executes user commands, keeps the active stream
//! window warm, and publishes state-change events to observers.
//!
//! ## Ordering Guarantee
//!
//! Every transition onto a track runs the same internal advance path:
//! queue advance, then window scheduling, then the `song_change` publish. The
//! publish is
//! synchronous and completes before the command returns, hence strictly
//! before the decode engine can obtain (and pull from) the new current
//! buffer. Observers never lag behind audible transitions.
//!
//! ## Concurrency
//!
//! Commands run on the caller's async context; only they take the queue's
//! write lock. The decode engine's pull surface (`current_source`,
//! `peek_upcoming`, `current_track`) takes read locks only. No lock is held
//! across an await or while publishing.

use crate::cache::TrackCache;
use crate::config::PlayerConfig;
use crate::error::Result;
use crate::fetch::FetchScheduler;
use crate::queue::PlaybackQueue;
use crate::stream_buffer::StreamBuffer;
use crate::traits::{QueueLookahead, StreamSource};
use cadence_library::models::{Track, TrackId};
use cadence_runtime::events::{EventBus, PlayerEvent, TrackSummary};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Streaming playback controller.
pub struct Player {
    config: PlayerConfig,
    queue: RwLock<PlaybackQueue>,
    playing: AtomicBool,
    scheduler: FetchScheduler,
    cache: Arc<TrackCache>,
    events: Arc<EventBus>,
}

impl Player {
    /// Create a player over a stream source and an event bus.
    pub fn new(source: Arc<dyn StreamSource>, events: Arc<EventBus>, config: PlayerConfig) -> Self {
        let cache = Arc::new(TrackCache::new(config.cache.clone()));
        Self {
            scheduler: FetchScheduler::new(source, Arc::clone(&cache)),
            queue: RwLock::new(PlaybackQueue::new()),
            playing: AtomicBool::new(false),
            cache,
            events,
            config,
        }
    }

    /// Validate configuration and prepare the local cache.
    pub async fn initialize(&self) -> Result<()> {
        self.config.validate()?;
        self.cache.initialize().await
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Replace the queue with a new sequence.
    ///
    /// Cancels every active stream (blocked readers unblock with
    /// end-of-stream) and resets the position; fires no event by itself.
    pub fn replace_queue(&self, tracks: Vec<Track>) {
        debug!(count = tracks.len(), "replacing queue");
        self.scheduler.cancel_all();
        self.queue.write().replace(tracks);
    }

    /// Append tracks without disturbing the current position or the playing
    /// state.
    pub fn append(&self, tracks: Vec<Track>) {
        self.queue.write().append(tracks);
    }

    /// Start playback at queue position `index`.
    ///
    /// Lands on the track through the same advance path as a normal song
    /// transition, so exactly one `song_change` fires regardless of whether
    /// playback starts fresh or mid-queue. Raises the playing flag first
    /// (publishing `playing_change` only if it actually changed).
    #[instrument(skip(self))]
    pub async fn play_from(&self, index: usize) -> Result<()> {
        self.queue.write().jump_to(index)?;
        self.set_playing(true);
        self.advance_internal().await
    }

    /// Skip to the next track (wraps past the end of the queue).
    pub async fn next(&self) -> Result<()> {
        self.advance_internal().await
    }

    /// Decode-engine hook: the current track finished; move on seamlessly.
    pub async fn on_track_complete(&self) -> Result<()> {
        self.advance_internal().await
    }

    /// Toggle the playing flag.
    ///
    /// Returns `false` and fires nothing when the queue is empty and nothing
    /// is playing; otherwise flips the flag and publishes `playing_change`.
    pub fn toggle_playing(&self) -> bool {
        let playing = self.playing.load(Ordering::Acquire);
        if !playing && self.queue.read().is_empty() {
            debug!("toggle_playing ignored: queue is empty");
            return false;
        }
        self.set_playing(!playing);
        true
    }

    /// Raise the playing flag.
    pub fn play(&self) {
        self.set_playing(true);
    }

    /// Clear the playing flag.
    pub fn pause(&self) {
        self.set_playing(false);
    }

    /// Stop playback: clear the playing flag and cancel every active
    /// stream so blocked readers see end-of-stream.
    pub fn stop(&self) {
        self.set_playing(false);
        self.scheduler.cancel_all();
    }

    // ========================================================================
    // Pull Surface (decode engine)
    // ========================================================================

    /// Byte source of the current track, once playback has started.
    pub fn current_source(&self) -> Option<StreamBuffer> {
        let id = self.queue.read().current()?.id.clone();
        self.scheduler.get(&id)
    }

    /// Currently selected track.
    pub fn current_track(&self) -> Option<Track> {
        self.queue.read().current().cloned()
    }

    /// Current queue index, if playback has started.
    pub fn position(&self) -> Option<usize> {
        self.queue.read().position()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.read().len()
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    /// The local track cache (for host inspection and maintenance).
    pub fn cache(&self) -> &TrackCache {
        &self.cache
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// The single song-transition path: advance, warm the window, notify.
    async fn advance_internal(&self) -> Result<()> {
        let transition = self.queue.write().advance()?;
        debug!(
            previous = transition.previous.as_ref().map(|t| t.id.as_str()),
            current = transition.current.id.as_str(),
            "advancing to next track"
        );

        self.schedule_window().await;

        self.events.publish(&PlayerEvent::SongChange {
            previous: transition.previous.as_ref().map(track_summary),
            current: track_summary(&transition.current),
        });
        Ok(())
    }

    /// Keep exactly the current track and the lookahead window streaming.
    async fn schedule_window(&self) {
        let window: Vec<Track> = {
            let queue = self.queue.read();
            let mut window = Vec::new();
            if let Some(current) = queue.current() {
                window.push(current.clone());
            }
            for upcoming in queue.peek(self.config.lookahead) {
                if !window.iter().any(|track| track.id == upcoming.id) {
                    window.push(upcoming);
                }
            }
            window
        };

        let keep: Vec<TrackId> = window.iter().map(|track| track.id.clone()).collect();
        self.scheduler.retain(&keep);
        for track in &window {
            self.scheduler.ensure_stream(track).await;
        }
    }

    fn set_playing(&self, value: bool) {
        if self.playing.swap(value, Ordering::AcqRel) != value {
            self.events
                .publish(&PlayerEvent::PlayingChange { playing: value });
        }
    }
}

impl QueueLookahead for Player {
    fn peek_upcoming(&self, n: usize) -> Vec<Track> {
        self.queue.read().peek(n)
    }
}

fn track_summary(track: &Track) -> TrackSummary {
    TrackSummary {
        id: track.id.to_string(),
        title: track.title.clone(),
        album: track.album.clone(),
        artist: track.artist.clone(),
    }
}
