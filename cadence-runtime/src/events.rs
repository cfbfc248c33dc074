//! # Event Bus System
//!
//! Provides the player's observer notification mechanism: a mapping from
//! event kind to an ordered list of handlers, with synchronous, in-order
//! delivery on the publishing thread.
//!
//! ## Overview
//!
//! The event system consists of:
//! - **Event Types**: Strongly-typed `PlayerEvent` variants for player state
//!   transitions
//! - **EventBus**: Per-kind handler registry with registration-order delivery
//! - **Failure Isolation**: A failing handler is logged and never prevents
//!   later handlers from running
//!
//! ## Delivery Semantics
//!
//! `publish` invokes every handler registered for the event's kind, in
//! registration order, on the calling thread, before it returns. This is what
//! lets the player guarantee that observers have seen a `song_change` before
//! the decode engine can pull a single byte of the new track. Duplicate
//! registration is allowed; each registered instance is invoked once per
//! event. Registration is append-only; there is no unsubscription (observer
//! lifetime is process lifetime).
//!
//! Handlers must not subscribe from within a callback: `publish` holds the
//! registry read lock while delivering.
//!
//! ## Usage
//!
//! ```rust
//! use cadence_runtime::events::{EventBus, EventKind, PlayerEvent};
//!
//! let bus = EventBus::new();
//! bus.subscribe(EventKind::PlayingChange, |event| {
//!     println!("received: {:?}", event);
//!     Ok(())
//! });
//!
//! bus.publish(&PlayerEvent::PlayingChange { playing: true });
//! ```

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

// ============================================================================
// Event Types
// ============================================================================

/// Lightweight track payload carried inside events.
///
/// Events deliberately carry a flattened summary rather than the full domain
/// model so observers (UI) can render a transition without further lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSummary {
    /// Opaque server identifier of the track.
    pub id: String,
    /// Track title.
    pub title: String,
    /// Album title.
    pub album: String,
    /// Album artist.
    pub artist: String,
}

/// Player state-transition events published through the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum PlayerEvent {
    /// The current song changed, either by a user command or because the
    /// previous song finished.
    SongChange {
        /// The track that was current before the transition, if any.
        previous: Option<TrackSummary>,
        /// The track that is now current.
        current: TrackSummary,
    },
    /// The playing flag flipped.
    PlayingChange {
        /// New value of the flag.
        playing: bool,
    },
}

impl PlayerEvent {
    /// Returns the kind used to route this event to its subscribers.
    pub fn kind(&self) -> EventKind {
        match self {
            PlayerEvent::SongChange { .. } => EventKind::SongChange,
            PlayerEvent::PlayingChange { .. } => EventKind::PlayingChange,
        }
    }

    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            PlayerEvent::SongChange { .. } => "Current song changed",
            PlayerEvent::PlayingChange { .. } => "Playing state changed",
        }
    }
}

/// Subscription key for [`PlayerEvent`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    SongChange,
    PlayingChange,
}

impl EventKind {
    /// Wire name of the event, as exposed to host observers.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::SongChange => "song_change",
            EventKind::PlayingChange => "playing_change",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Handler invoked for each published event of the subscribed kind.
pub type EventHandler = Box<dyn Fn(&PlayerEvent) -> anyhow::Result<()> + Send + Sync>;

/// Per-kind ordered handler registry.
///
/// Thread-safe (`Send + Sync`); share across tasks with `Arc`.
#[derive(Default)]
pub struct EventBus {
    handlers: RwLock<HashMap<EventKind, Vec<EventHandler>>>,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one event kind.
    ///
    /// Handlers are appended; delivery order equals registration order.
    /// Registering the same closure twice invokes it twice per event.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F)
    where
        F: Fn(&PlayerEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.handlers
            .write()
            .entry(kind)
            .or_default()
            .push(Box::new(handler));
    }

    /// Number of handlers registered for a kind.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.handlers
            .read()
            .get(&kind)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Synchronously deliver `event` to every handler of its kind, in
    /// registration order, on the calling thread.
    ///
    /// A handler error is logged and does not stop delivery to later
    /// handlers, nor does it surface to the publisher. Returns the number of
    /// handlers invoked.
    pub fn publish(&self, event: &PlayerEvent) -> usize {
        let handlers = self.handlers.read();
        let Some(list) = handlers.get(&event.kind()) else {
            return 0;
        };

        let mut delivered = 0;
        for handler in list {
            delivered += 1;
            if let Err(error) = handler(event) {
                warn!(event = %event.kind(), %error, "event handler failed");
            }
        }
        delivered
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.handlers.read();
        f.debug_struct("EventBus")
            .field(
                "song_change_handlers",
                &handlers.get(&EventKind::SongChange).map_or(0, Vec::len),
            )
            .field(
                "playing_change_handlers",
                &handlers.get(&EventKind::PlayingChange).map_or(0, Vec::len),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn summary(id: &str) -> TrackSummary {
        TrackSummary {
            id: id.to_string(),
            title: format!("Title {}", id),
            album: "Album".to_string(),
            artist: "Artist".to_string(),
        }
    }

    #[test]
    fn delivery_matches_registration_order() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..4 {
            let order = Arc::clone(&order);
            bus.subscribe(EventKind::SongChange, move |_| {
                order.lock().unwrap().push(i);
                Ok(())
            });
        }

        let delivered = bus.publish(&PlayerEvent::SongChange {
            previous: None,
            current: summary("a"),
        });

        assert_eq!(delivered, 4);
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn duplicate_registration_is_invoked_once_each() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let count = Arc::clone(&count);
            bus.subscribe(EventKind::PlayingChange, move |_| {
                count.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }

        bus.publish(&PlayerEvent::PlayingChange { playing: true });
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failing_handler_does_not_stop_later_handlers() {
        let bus = EventBus::new();
        let reached = Arc::new(AtomicUsize::new(0));

        bus.subscribe(EventKind::PlayingChange, |_| {
            Err(anyhow::anyhow!("observer blew up"))
        });
        let reached_clone = Arc::clone(&reached);
        bus.subscribe(EventKind::PlayingChange, move |_| {
            reached_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let delivered = bus.publish(&PlayerEvent::PlayingChange { playing: false });
        assert_eq!(delivered, 2);
        assert_eq!(reached.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn events_are_routed_by_kind() {
        let bus = EventBus::new();
        let playing_calls = Arc::new(AtomicUsize::new(0));

        let playing_clone = Arc::clone(&playing_calls);
        bus.subscribe(EventKind::PlayingChange, move |_| {
            playing_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let delivered = bus.publish(&PlayerEvent::SongChange {
            previous: None,
            current: summary("b"),
        });

        assert_eq!(delivered, 0);
        assert_eq!(playing_calls.load(Ordering::SeqCst), 0);
        assert_eq!(bus.subscriber_count(EventKind::PlayingChange), 1);
        assert_eq!(bus.subscriber_count(EventKind::SongChange), 0);
    }

    #[test]
    fn event_kind_wire_names() {
        assert_eq!(EventKind::SongChange.to_string(), "song_change");
        assert_eq!(EventKind::PlayingChange.to_string(), "playing_change");
    }

    #[test]
    fn events_serialize_with_snake_case_tags() {
        let event = PlayerEvent::PlayingChange { playing: true };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "playing_change");
        assert_eq!(json["payload"]["playing"], true);
    }
}
