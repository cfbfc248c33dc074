//! # Library Models Module
//!
//! Domain models for tracks and albums as reported by the remote media
//! server.
//!
//! ## Overview
//!
//! This module contains the metadata types the playback core operates on.
//! Models are constructed by deserializing the server's item JSON and are
//! immutable afterwards; byte content is owned elsewhere (by the active
//! stream window), never by these types.

pub mod models;

pub use models::{Album, AlbumId, Track, TrackId};
