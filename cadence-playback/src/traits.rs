//! # Core Playback Traits
//!
//! Seams between the playback core and its excluded collaborators.
//!
//! ## Architecture
//!
//! The core sits between three externals:
//!
//! - **Network** ([`StreamSource`]): produces a track's encoded bytes as a
//!   fallible chunk stream. Implemented over HTTP behind the
//!   `http-streaming` feature; hosts and tests may supply their own.
//! - **Decode engine** ([`PacketSource`]): the pull side. The engine drains
//!   a track's bytes with `read_packet`/`seek`; [`StreamBuffer`] satisfies
//!   this directly, blocking the engine when bytes have not yet arrived.
//! - **Lookahead hook** ([`QueueLookahead`]): lets the engine ask for the
//!   next `n` tracks so it can open them before the current one ends
//!   (gapless transitions).

use crate::error::Result;
use crate::stream_buffer::StreamBuffer;
use async_trait::async_trait;
use bytes::Bytes;
use cadence_library::models::{Track, TrackId};
use futures::stream::BoxStream;
use std::io::SeekFrom;

/// Stream of encoded audio chunks; any item may fail with
/// [`Transport`](crate::error::PlaybackError::Transport).
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

// ============================================================================
// Network Seam
// ============================================================================

/// Source of a track's encoded audio bytes.
///
/// One call per fetch; the returned stream is drained by a background task
/// that writes each chunk into the track's buffer as it arrives.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StreamSource: Send + Sync {
    /// Open the audio stream for one track.
    async fn fetch_stream(&self, track_id: &TrackId) -> Result<ByteStream>;
}

// ============================================================================
// Decode Engine Seam
// ============================================================================

/// Pull surface consumed by the decode engine.
///
/// `read_packet` blocks the engine's thread while bytes are still in flight;
/// an empty result marks end-of-stream.
pub trait PacketSource: Send {
    /// Read up to `max_len` bytes, blocking until available or end-of-stream.
    fn read_packet(&mut self, max_len: usize) -> Bytes;

    /// Move the read cursor.
    fn seek(&mut self, pos: SeekFrom) -> Result<u64>;

    /// Current read cursor position.
    fn tell(&self) -> u64;
}

impl PacketSource for StreamBuffer {
    fn read_packet(&mut self, max_len: usize) -> Bytes {
        StreamBuffer::read(self, max_len)
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        StreamBuffer::seek(self, pos)
    }

    fn tell(&self) -> u64 {
        StreamBuffer::tell(self)
    }
}

/// Lookahead hook: the next `n` tracks in play order, without advancing.
pub trait QueueLookahead {
    fn peek_upcoming(&self, n: usize) -> Vec<Track>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn mock_source_yields_chunks() {
        let mut source = MockStreamSource::new();
        source.expect_fetch_stream().returning(|_| {
            let chunks: Vec<Result<Bytes>> =
                vec![Ok(Bytes::from_static(b"ab")), Ok(Bytes::from_static(b"cd"))];
            Ok(futures::stream::iter(chunks).boxed())
        });

        let mut stream = source
            .fetch_stream(&TrackId::new("t1"))
            .await
            .unwrap();

        let mut collected = Vec::new();
        while let Some(chunk) = stream.next().await {
            collected.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(collected, b"abcd");
    }

    #[test]
    fn stream_buffer_is_a_packet_source() {
        let mut buffer = StreamBuffer::new();
        buffer.write(b"packet data").unwrap();
        buffer.close();

        let source: &mut dyn PacketSource = &mut buffer;
        assert_eq!(&source.read_packet(6)[..], b"packet");
        assert_eq!(source.tell(), 6);
        source.seek(SeekFrom::Start(7)).unwrap();
        assert_eq!(&source.read_packet(16)[..], b"data");
    }
}
