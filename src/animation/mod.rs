//! Animation clip data.
//!
//! Clips are carried through cloning by reference; playback is handled by
//! the host application.

pub mod clip;

pub use clip::{AnimationClip, TargetPath, Track, TrackValues};
