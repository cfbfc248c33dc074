//! # Stream Buffer
//!
//! A growable byte store written by one network producer and drained by one
//! decode consumer, with independent read/write cursors.
//!
//! ## Design
//!
//! - **Write side**: append-only cursor, separately positionable with
//!   [`StreamBuffer::seek_write`]; a gap between the current end and the
//!   write cursor is zero-filled, so readers never observe uninitialized
//!   memory.
//! - **Read side**: an independent cursor that may seek anywhere
//!   non-negative, including ahead of the written length; a read at an
//!   unwritten region blocks until the producer catches up.
//! - **Wakeups**: a condition variable keyed to byte availability, so a
//!   partial write releases a partial read without busy-waiting, and
//!   [`StreamBuffer::close`] / [`StreamBuffer::discard`] release every
//!   blocked reader with an end-of-stream result instead of hanging.
//!
//! Handles are cheap clones sharing one store; hand one to exactly one
//! producer and one consumer.
//!
//! ## Usage
//!
//! ```rust
//! use cadence_playback::stream_buffer::StreamBuffer;
//!
//! let buffer = StreamBuffer::new();
//!
//! // Producer: append chunks as they arrive
//! buffer.write(b"hello").unwrap();
//! buffer.close();
//!
//! // Consumer: drain; a short read marks end-of-stream
//! let bytes = buffer.read(16);
//! assert_eq!(&bytes[..], b"hello");
//! assert!(buffer.read(16).is_empty());
//! ```

use crate::error::{PlaybackError, Result};
use bytes::Bytes;
use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};
use std::sync::Arc;

/// Shared byte store with independent read/write cursors and blocking reads.
#[derive(Clone, Default)]
pub struct StreamBuffer {
    inner: Arc<BufferInner>,
}

#[derive(Default)]
struct BufferInner {
    state: Mutex<BufferState>,
    readable: Condvar,
}

#[derive(Default)]
struct BufferState {
    data: Vec<u8>,
    read_pos: usize,
    write_pos: usize,
    closed: bool,
    discarded: bool,
}

impl StreamBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with reserved capacity (e.g. from a
    /// Content-Length hint).
    pub fn with_capacity(capacity: usize) -> Self {
        let buffer = Self::new();
        buffer.inner.state.lock().data.reserve(capacity);
        buffer
    }

    /// Append a chunk at the write cursor.
    ///
    /// Any gap left by [`seek_write`](Self::seek_write) is zero-filled first.
    /// Wakes blocked readers. Returns the number of bytes written.
    ///
    /// Fails with [`PlaybackError::InvalidInput`] once the buffer is closed
    /// or discarded; a producer whose buffer was discarded must stop (this is
    /// the ownership check for cancelled fetches).
    pub fn write(&self, chunk: &[u8]) -> Result<usize> {
        let mut state = self.inner.state.lock();
        if state.discarded {
            return Err(PlaybackError::InvalidInput(
                "write to discarded buffer".to_string(),
            ));
        }
        if state.closed {
            return Err(PlaybackError::InvalidInput(
                "write to closed buffer".to_string(),
            ));
        }
        if chunk.is_empty() {
            return Ok(0);
        }

        let start = state.write_pos;
        let end = start + chunk.len();
        if state.data.len() < end {
            // resize zero-fills any gap between the old end and `start`
            state.data.resize(end, 0);
        }
        state.data[start..end].copy_from_slice(chunk);
        state.write_pos = end;

        drop(state);
        self.inner.readable.notify_all();
        Ok(chunk.len())
    }

    /// Read up to `max_len` bytes from the read cursor, blocking until that
    /// many are available or the stream has ended.
    ///
    /// Returns exactly `max_len` bytes unless the buffer has been closed, in
    /// which case the remaining tail is returned; an empty result marks
    /// end-of-stream. `read(0)` returns immediately. Never hangs once the
    /// producer has terminated, normally or otherwise.
    pub fn read(&self, max_len: usize) -> Bytes {
        if max_len == 0 {
            return Bytes::new();
        }

        let mut state = self.inner.state.lock();
        loop {
            let available = state.data.len().saturating_sub(state.read_pos);
            if available >= max_len || state.closed {
                let take = available.min(max_len);
                let start = state.read_pos;
                let bytes = Bytes::copy_from_slice(&state.data[start..start + take]);
                state.read_pos += take;
                return bytes;
            }
            self.inner.readable.wait(&mut state);
        }
    }

    /// Move the read cursor.
    ///
    /// Never blocks; a target beyond the written length is allowed and only
    /// subsequent reads block there. A negative resulting position fails with
    /// [`PlaybackError::InvalidSeek`].
    pub fn seek(&self, pos: SeekFrom) -> Result<u64> {
        let mut state = self.inner.state.lock();
        let target = match pos {
            SeekFrom::Start(offset) => offset as i64,
            SeekFrom::Current(delta) => state.read_pos as i64 + delta,
            SeekFrom::End(delta) => state.data.len() as i64 + delta,
        };
        if target < 0 {
            return Err(PlaybackError::InvalidSeek { position: target });
        }
        state.read_pos = target as usize;
        Ok(target as u64)
    }

    /// Current read cursor position.
    pub fn tell(&self) -> u64 {
        self.inner.state.lock().read_pos as u64
    }

    /// Position the write cursor for write-ahead.
    ///
    /// The gap between the current end and `offset` is zero-filled by the
    /// next write. Returns the new position.
    pub fn seek_write(&self, offset: u64) -> u64 {
        self.inner.state.lock().write_pos = offset as usize;
        offset
    }

    /// Current write cursor position.
    pub fn write_position(&self) -> u64 {
        self.inner.state.lock().write_pos as u64
    }

    /// Logical length of the store, including zero-filled gaps.
    pub fn len(&self) -> u64 {
        self.inner.state.lock().data.len() as u64
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes currently readable from the read cursor without blocking.
    pub fn available(&self) -> usize {
        let state = self.inner.state.lock();
        state.data.len().saturating_sub(state.read_pos)
    }

    /// Stable copy of everything written so far (for cache persistence).
    pub fn snapshot(&self) -> Bytes {
        Bytes::copy_from_slice(&self.inner.state.lock().data)
    }

    /// Mark end-of-stream: no further writes are accepted and every blocked
    /// reader is released to drain the remainder. Idempotent.
    pub fn close(&self) {
        let mut state = self.inner.state.lock();
        state.closed = true;
        drop(state);
        self.inner.readable.notify_all();
    }

    /// Close the buffer and reject all future writes.
    ///
    /// Used when the owning track leaves the active window while a fetch may
    /// still be in flight; blocked readers drain and then see end-of-stream.
    pub fn discard(&self) {
        let mut state = self.inner.state.lock();
        state.closed = true;
        state.discarded = true;
        drop(state);
        self.inner.readable.notify_all();
    }

    /// Returns `true` once the stream has ended (close or discard).
    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().closed
    }

    /// Returns `true` if the buffer was discarded.
    pub fn is_discarded(&self) -> bool {
        self.inner.state.lock().discarded
    }
}

impl fmt::Debug for StreamBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("StreamBuffer")
            .field("len", &state.data.len())
            .field("read_pos", &state.read_pos)
            .field("write_pos", &state.write_pos)
            .field("closed", &state.closed)
            .field("discarded", &state.discarded)
            .finish()
    }
}

impl Read for StreamBuffer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let bytes = StreamBuffer::read(self, buf.len());
        buf[..bytes.len()].copy_from_slice(&bytes);
        Ok(bytes.len())
    }
}

impl Seek for StreamBuffer {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        StreamBuffer::seek(self, pos)
            .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))
    }
}
