//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (e.g., `cadence-runtime`, `cadence-library`,
//! `cadence-playback`). Host applications can depend on `cadence-workspace`
//! and enable the documented features without needing to wire each crate
//! individually.
