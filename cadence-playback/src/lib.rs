//! # Playback & Streaming Module
//!
//! The streaming playback core: a track's bytes are written by a network
//! producer and simultaneously drained by a pull-based decode engine, while
//! a circular queue controller keeps the next tracks' fetches ahead of
//! playback for gapless transitions.
//!
//! ## Overview
//!
//! This module handles:
//! - Dual-cursor stream buffers with blocking reads
//! - Local caching of completed streams (cache-first fetch policy)
//! - Background fetch scheduling over the active window, with cancellation
//! - The circular playback queue and its command/event controller

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod player;
pub mod queue;
pub mod stream_buffer;
pub mod traits;

#[cfg(feature = "http-streaming")]
pub mod http;

pub use cache::{CacheStats, TrackCache};
pub use config::{CacheConfig, PlayerConfig};
pub use error::{PlaybackError, Result};
pub use fetch::FetchScheduler;
pub use player::Player;
pub use queue::{PlaybackQueue, SongTransition};
pub use stream_buffer::StreamBuffer;
pub use traits::{ByteStream, PacketSource, QueueLookahead, StreamSource};

#[cfg(feature = "http-streaming")]
pub use http::HttpStreamSource;
