//! # Playback Queue
//!
//! Ordered, circular collection of tracks with a single current-position
//! cursor.
//!
//! The cursor starts at "not started" (-1); every transition onto a track,
//! including the very first after [`jump_to`](PlaybackQueue::jump_to), goes
//! through [`advance`](PlaybackQueue::advance), so there is exactly one
//! song-change path. Advancing past the last element wraps to 0: continuous
//! looping is the documented behavior, not a boundary bug.
//!
//! Only the controller mutates the cursor; `peek`/`current` are read-only
//! and safe to call from the decode engine's context through the player's
//! lock.

use crate::error::{PlaybackError, Result};
use cadence_library::models::Track;

/// Circular track sequence with a current cursor.
#[derive(Debug)]
pub struct PlaybackQueue {
    tracks: Vec<Track>,
    /// Current index, or -1 before the first advance.
    cursor: isize,
    /// Set by a jump: the track that was actually current beforehand, so the
    /// following advance reports it (not the jump target's neighbor) as the
    /// transition's previous track.
    pending_previous: Option<Option<Track>>,
}

/// Result of one advance: the song-change payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongTransition {
    /// Track that was current before, if any.
    pub previous: Option<Track>,
    /// Track that is current now.
    pub current: Track,
}

impl Default for PlaybackQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            tracks: Vec::new(),
            cursor: -1,
            pending_previous: None,
        }
    }

    /// Replace the whole sequence and reset the cursor to "not started".
    ///
    /// Fires no event by itself; the next advance produces the first
    /// song change.
    pub fn replace(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
        self.cursor = -1;
        self.pending_previous = None;
    }

    /// Extend the sequence in place without disturbing the cursor.
    pub fn append(&mut self, tracks: Vec<Track>) {
        self.tracks.extend(tracks);
    }

    /// Position the cursor just before `index`, so the next advance lands on
    /// it through the normal song-change path.
    pub fn jump_to(&mut self, index: usize) -> Result<()> {
        if index >= self.tracks.len() {
            return Err(PlaybackError::InvalidIndex {
                index,
                len: self.tracks.len(),
            });
        }
        self.pending_previous = Some(self.current().cloned());
        self.cursor = index as isize - 1;
        Ok(())
    }

    /// Step to the next track, wrapping past the end.
    pub fn advance(&mut self) -> Result<SongTransition> {
        if self.tracks.is_empty() {
            return Err(PlaybackError::EmptyQueue);
        }

        let previous = self
            .pending_previous
            .take()
            .unwrap_or_else(|| self.current().cloned());
        let len = self.tracks.len() as isize;
        self.cursor = (self.cursor + 1).rem_euclid(len);
        let current = self.tracks[self.cursor as usize].clone();

        Ok(SongTransition { previous, current })
    }

    /// Up to `n` upcoming tracks in wrap-around order, without moving the
    /// cursor. Never yields more tracks than the queue holds.
    pub fn peek(&self, n: usize) -> Vec<Track> {
        if self.tracks.is_empty() || n == 0 {
            return Vec::new();
        }
        let len = self.tracks.len();
        let next = (self.cursor + 1).rem_euclid(len as isize) as usize;
        self.tracks
            .iter()
            .cycle()
            .skip(next)
            .take(n.min(len))
            .cloned()
            .collect()
    }

    /// Currently selected track, if playback has started.
    pub fn current(&self) -> Option<&Track> {
        if self.cursor < 0 {
            None
        } else {
            self.tracks.get(self.cursor as usize)
        }
    }

    /// Current index, or `None` before the first advance.
    pub fn position(&self) -> Option<usize> {
        (self.cursor >= 0).then_some(self.cursor as usize)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// The full sequence, in order.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str) -> Track {
        Track::new(id, format!("Title {}", id), "Album", "Artist")
    }

    fn queue_of(ids: &[&str]) -> PlaybackQueue {
        let mut queue = PlaybackQueue::new();
        queue.replace(ids.iter().copied().map(track).collect());
        queue
    }

    #[test]
    fn advance_walks_the_queue_in_order() {
        let mut queue = queue_of(&["a", "b", "c"]);
        assert_eq!(queue.current(), None);
        assert_eq!(queue.position(), None);

        let first = queue.advance().unwrap();
        assert_eq!(first.previous, None);
        assert_eq!(first.current.id.as_str(), "a");

        let second = queue.advance().unwrap();
        assert_eq!(second.previous.unwrap().id.as_str(), "a");
        assert_eq!(second.current.id.as_str(), "b");
        assert_eq!(queue.position(), Some(1));
    }

    #[test]
    fn advancing_len_plus_one_times_returns_to_start() {
        let mut queue = queue_of(&["a", "b", "c"]);
        queue.advance().unwrap();
        let start = queue.current().unwrap().clone();

        for _ in 0..queue.len() {
            queue.advance().unwrap();
        }
        assert_eq!(queue.current(), Some(&start));
    }

    #[test]
    fn wrap_around_reports_previous_track() {
        let mut queue = queue_of(&["a", "b"]);
        queue.advance().unwrap();
        queue.advance().unwrap();

        let wrapped = queue.advance().unwrap();
        assert_eq!(wrapped.previous.unwrap().id.as_str(), "b");
        assert_eq!(wrapped.current.id.as_str(), "a");
    }

    #[test]
    fn advance_on_empty_queue_fails() {
        let mut queue = PlaybackQueue::new();
        assert!(matches!(queue.advance(), Err(PlaybackError::EmptyQueue)));
    }

    #[test]
    fn jump_to_lands_on_index_via_advance() {
        let mut queue = queue_of(&["a", "b", "c"]);
        queue.jump_to(2).unwrap();

        let transition = queue.advance().unwrap();
        assert_eq!(transition.previous, None);
        assert_eq!(transition.current.id.as_str(), "c");
    }

    #[test]
    fn jump_while_playing_reports_the_prior_track_as_previous() {
        let mut queue = queue_of(&["a", "b", "c"]);
        queue.advance().unwrap(); // current = a

        queue.jump_to(2).unwrap();
        let transition = queue.advance().unwrap();
        assert_eq!(transition.previous.unwrap().id.as_str(), "a");
        assert_eq!(transition.current.id.as_str(), "c");
    }

    #[test]
    fn jump_to_out_of_range_fails() {
        let mut queue = queue_of(&["a"]);
        assert!(matches!(
            queue.jump_to(1),
            Err(PlaybackError::InvalidIndex { index: 1, len: 1 })
        ));
    }

    #[test]
    fn peek_wraps_without_moving_the_cursor() {
        let mut queue = queue_of(&["a", "b", "c"]);
        queue.advance().unwrap();
        queue.advance().unwrap(); // current = b

        let upcoming = queue.peek(3);
        let ids: Vec<&str> = upcoming.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["c", "a", "b"]);
        assert_eq!(queue.position(), Some(1));
    }

    #[test]
    fn peek_before_start_begins_at_first_track() {
        let queue = queue_of(&["a", "b", "c"]);
        let ids: Vec<String> = queue.peek(2).iter().map(|t| t.id.to_string()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn peek_never_exceeds_queue_length() {
        let queue = queue_of(&["a", "b"]);
        assert_eq!(queue.peek(10).len(), 2);
        assert!(PlaybackQueue::new().peek(3).is_empty());
        assert!(queue.peek(0).is_empty());
    }

    #[test]
    fn append_preserves_cursor_and_order() {
        let mut queue = queue_of(&["a"]);
        queue.advance().unwrap();
        queue.append(vec![track("b"), track("c")]);

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.position(), Some(0));
        let upcoming = queue.peek(2);
        let ids: Vec<&str> = upcoming.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["b", "c"]);
    }

    #[test]
    fn replace_resets_cursor() {
        let mut queue = queue_of(&["a", "b"]);
        queue.advance().unwrap();
        queue.replace(vec![track("x")]);
        assert_eq!(queue.current(), None);
        assert_eq!(queue.position(), None);

        queue.replace(Vec::new());
        assert!(queue.is_empty());
    }
}
