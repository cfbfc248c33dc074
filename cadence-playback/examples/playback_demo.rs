//! # Playback Core Usage Example
//!
//! Demonstrates the command/event flow of the player controller with an
//! in-memory stream source standing in for the media server.
//!
//! Run with: `cargo run --example playback_demo --package cadence-playback`

use async_trait::async_trait;
use bytes::Bytes;
use cadence_library::models::{Track, TrackId};
use cadence_playback::config::{CacheConfig, PlayerConfig};
use cadence_playback::traits::{ByteStream, StreamSource};
use cadence_playback::{Player, Result};
use cadence_runtime::events::{EventBus, EventKind, PlayerEvent};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// In-Memory Stream Source (for demonstration)
// ============================================================================

/// Serves each track as a handful of synthetic chunks.
struct DemoSource;

#[async_trait]
impl StreamSource for DemoSource {
    async fn fetch_stream(&self, track_id: &TrackId) -> Result<ByteStream> {
        let chunks: Vec<Result<Bytes>> = (0..4)
            .map(|i| Ok(Bytes::from(format!("[{}:chunk{}]", track_id, i))))
            .collect();
        Ok(futures::stream::iter(chunks).boxed())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let bus = Arc::new(EventBus::new());

    bus.subscribe(EventKind::SongChange, |event| {
        if let PlayerEvent::SongChange { previous, current } = event {
            let from = previous
                .as_ref()
                .map(|t| t.title.as_str())
                .unwrap_or("(start)");
            println!("song_change: {} -> {}", from, current.title);
        }
        Ok(())
    });
    bus.subscribe(EventKind::PlayingChange, |event| {
        if let PlayerEvent::PlayingChange { playing } = event {
            println!("playing_change: {}", playing);
        }
        Ok(())
    });

    let cache_dir = std::env::temp_dir().join("cadence-demo-cache");
    let config = PlayerConfig {
        lookahead: 1,
        cache: CacheConfig::default().with_directory(cache_dir),
    };

    let player = Player::new(Arc::new(DemoSource), Arc::clone(&bus), config);
    player.initialize().await?;

    player.replace_queue(vec![
        Track::new("t1", "First Song", "Demo Album", "Demo Artist"),
        Track::new("t2", "Second Song", "Demo Album", "Demo Artist"),
        Track::new("t3", "Third Song", "Demo Album", "Demo Artist"),
    ]);

    player.play_from(0).await?;

    // Drain the current track the way a decode engine would.
    let buffer = player.current_source().expect("current stream missing");
    while !buffer.is_closed() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let mut total = 0;
    loop {
        let packet = buffer.read(8);
        if packet.is_empty() {
            break;
        }
        total += packet.len();
    }
    println!("drained {} bytes from the current track", total);

    // The decode engine reports completion; the queue advances seamlessly.
    player.on_track_complete().await?;
    player.on_track_complete().await?;
    player.on_track_complete().await?; // wraps back to the first song

    player.stop();
    Ok(())
}
