//! Audio playback capability
//!
//! Decoding and the audio bus live outside this crate. A channel is bound to
//! one audio asset and only has to start, stop and report progress.

/// Ambient loop, played while waiting for a trigger
pub const AMBIENT_TRACK: &str = "/sd/000.wav";

/// One-shot clip played when triggered
pub const TRIGGER_TRACK: &str = "/sd/001.wav";

/// Playback of a single bound audio asset
pub trait PlaybackChannel {
    /// Start playback from the beginning
    fn play(&mut self, looping: bool);

    /// Stop playback
    fn stop(&mut self);

    /// Whether audio is still being produced
    fn is_playing(&self) -> bool;
}
