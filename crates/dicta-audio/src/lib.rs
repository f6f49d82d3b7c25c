//! Dicta Audio crate - playback of synthesized dictation audio.
//!
//! Provides a trait-based seam over the actual audio device so the session
//! engine and tests never touch hardware directly. `PlaybackController` owns
//! one clip at a time and exposes the play/pause/replay surface; the backend
//! is either `RodioOutput` (behind the `playback` feature) or
//! `MockAudioOutput` for tests and headless runs.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use dicta_core::error::{DictaError, Result};

pub mod controller;
#[cfg(feature = "playback")]
pub mod rodio_output;

pub use controller::PlaybackController;
#[cfg(feature = "playback")]
pub use rodio_output::RodioOutput;

/// Backend seam for audio output.
///
/// Implementations hold at most one decoded clip. `load` replaces any
/// previous clip; control methods act on the current clip only, so a
/// successful `load` must leave no residue of the prior one.
pub trait AudioOutput: Send {
    /// Decode and take ownership of a clip. Fails with
    /// [`DictaError::AudioLoad`] on absent or undecodable bytes, in which
    /// case no clip is loaded.
    fn load(&mut self, bytes: &[u8]) -> Result<()>;

    /// Begin or resume playback of the current clip.
    fn play(&mut self);

    /// Pause playback, keeping the current position.
    fn pause(&mut self);

    /// Rewind to the start of the clip, pausing playback.
    fn seek_to_start(&mut self);

    /// Whether audio is audibly playing right now.
    fn is_playing(&self) -> bool;

    /// Drop the current clip and free any device-side resources backing it.
    fn release(&mut self);
}

// =============================================================================
// Mock implementation
// =============================================================================

/// Mock audio output for testing and headless runs.
///
/// Tracks loaded/playing/position state via atomics shared across clones, so
/// a test can keep a clone and observe what the controller did with the
/// original.
#[derive(Debug, Clone, Default)]
pub struct MockAudioOutput {
    state: Arc<MockState>,
}

#[derive(Debug, Default)]
struct MockState {
    loaded: AtomicBool,
    playing: AtomicBool,
    at_start: AtomicBool,
    loads: AtomicUsize,
}

impl MockAudioOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a clip is currently loaded.
    pub fn is_loaded(&self) -> bool {
        self.state.loaded.load(Ordering::Relaxed)
    }

    /// Whether the playhead sits at the start of the clip.
    pub fn is_at_start(&self) -> bool {
        self.state.at_start.load(Ordering::Relaxed)
    }

    /// Number of successful `load` calls.
    pub fn load_count(&self) -> usize {
        self.state.loads.load(Ordering::Relaxed)
    }
}

impl AudioOutput for MockAudioOutput {
    fn load(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Err(DictaError::AudioLoad("empty audio payload".to_string()));
        }
        self.state.loaded.store(true, Ordering::Relaxed);
        self.state.playing.store(false, Ordering::Relaxed);
        self.state.at_start.store(true, Ordering::Relaxed);
        self.state.loads.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn play(&mut self) {
        if self.state.loaded.load(Ordering::Relaxed) {
            self.state.playing.store(true, Ordering::Relaxed);
            self.state.at_start.store(false, Ordering::Relaxed);
        }
    }

    fn pause(&mut self) {
        self.state.playing.store(false, Ordering::Relaxed);
    }

    fn seek_to_start(&mut self) {
        if self.state.loaded.load(Ordering::Relaxed) {
            self.state.at_start.store(true, Ordering::Relaxed);
            self.state.playing.store(false, Ordering::Relaxed);
        }
    }

    fn is_playing(&self) -> bool {
        self.state.playing.load(Ordering::Relaxed)
    }

    fn release(&mut self) {
        self.state.loaded.store(false, Ordering::Relaxed);
        self.state.playing.store(false, Ordering::Relaxed);
        self.state.at_start.store(false, Ordering::Relaxed);
    }
}

// =============================================================================
// Tests
// =============================================================================
