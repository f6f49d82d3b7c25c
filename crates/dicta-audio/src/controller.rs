//! Playback controller owning the audio resource for one session.
//!
//! Wraps an [`AudioOutput`] backend with the control surface a session
//! exposes to its UI: load, play, pause, replay, and an observable
//! `is_playing` flag. The controller releases the clip on every exit path —
//! explicit `release`, a replacing `load`, or drop — so the device-side
//! resource never leaks past the session that acquired it.

use tokio::sync::watch;
use tracing::debug;

use dicta_core::error::Result;

use crate::AudioOutput;

/// Play/pause/replay surface over exactly one loaded clip.
///
/// `is_playing` transitions are published synchronously from the control call
/// that caused them, and a replacing `load` releases the previous clip before
/// touching the new one, so observers never see a stale flip from an earlier
/// clip after `load` returns.
pub struct PlaybackController {
    output: Box<dyn AudioOutput>,
    loaded: bool,
    playing_tx: watch::Sender<bool>,
}

impl PlaybackController {
    pub fn new(output: Box<dyn AudioOutput>) -> Self {
        let (playing_tx, _) = watch::channel(false);
        Self {
            output,
            loaded: false,
            playing_tx,
        }
    }

    /// Load a clip from raw encoded bytes, replacing any previous clip.
    ///
    /// On failure no clip is loaded and the controller behaves as freshly
    /// constructed; the caller is expected to continue the session without
    /// audio.
    pub fn load(&mut self, bytes: &[u8]) -> Result<()> {
        if self.loaded {
            self.output.release();
            self.loaded = false;
        }
        self.playing_tx.send_replace(false);

        match self.output.load(bytes) {
            Ok(()) => {
                self.loaded = true;
                debug!(bytes = bytes.len(), "Audio clip loaded");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Begin or resume playback. No-op when nothing is loaded.
    pub fn play(&mut self) {
        if !self.loaded {
            debug!("play ignored: no clip loaded");
            return;
        }
        self.output.play();
        self.publish();
    }

    /// Pause playback. No-op when nothing is loaded.
    pub fn pause(&mut self) {
        if !self.loaded {
            debug!("pause ignored: no clip loaded");
            return;
        }
        self.output.pause();
        self.publish();
    }

    /// Seek to the start and play. No-op when nothing is loaded.
    pub fn replay(&mut self) {
        if !self.loaded {
            debug!("replay ignored: no clip loaded");
            return;
        }
        self.output.seek_to_start();
        self.output.play();
        self.publish();
    }

    /// Pause and seek back to the start without playing.
    ///
    /// Used when the session leaves the listening phase.
    pub fn rewind(&mut self) {
        if !self.loaded {
            return;
        }
        self.output.pause();
        self.output.seek_to_start();
        self.publish();
    }

    /// Whether audio is audibly playing right now, sampled on demand.
    pub fn is_playing(&self) -> bool {
        self.loaded && self.output.is_playing()
    }

    /// Whether a clip is currently loaded.
    pub fn has_clip(&self) -> bool {
        self.loaded
    }

    /// Subscribe to `is_playing` transitions.
    ///
    /// The flag is updated on every control invocation and on [`refresh`].
    ///
    /// [`refresh`]: Self::refresh
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.playing_tx.subscribe()
    }

    /// Re-sample the backend and publish the current `is_playing` value.
    ///
    /// Lets callers observe a clip that reached its natural end without any
    /// ticking clock inside the controller.
    pub fn refresh(&mut self) {
        self.publish();
    }

    /// Release the clip and its device-side resources.
    pub fn release(&mut self) {
        if self.loaded {
            self.output.release();
            self.loaded = false;
            debug!("Audio clip released");
        }
        self.playing_tx.send_replace(false);
    }

    fn publish(&mut self) {
        let playing = self.loaded && self.output.is_playing();
        self.playing_tx.send_replace(playing);
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.release();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockAudioOutput;
    use dicta_core::error::DictaError;

    fn controller_with_observer() -> (PlaybackController, MockAudioOutput) {
        let output = MockAudioOutput::new();
        let observer = output.clone();
        (PlaybackController::new(Box::new(output)), observer)
    }

    #[test]
    fn test_controls_are_noops_without_clip() {
        let (mut controller, observer) = controller_with_observer();
        controller.play();
        controller.pause();
        controller.replay();
        assert!(!controller.is_playing());
        assert!(!observer.is_playing());
    }

    #[test]
    fn test_load_failure_leaves_controller_empty() {
        let (mut controller, _) = controller_with_observer();
        let result = controller.load(&[]);
        assert!(matches!(result, Err(DictaError::AudioLoad(_))));
        assert!(!controller.has_clip());

        // Still safe to invoke controls afterwards.
        controller.play();
        assert!(!controller.is_playing());
    }

    #[test]
    fn test_play_pause_updates_flag() {
        let (mut controller, _) = controller_with_observer();
        controller.load(&[1, 2, 3]).unwrap();

        controller.play();
        assert!(controller.is_playing());

        controller.pause();
        assert!(!controller.is_playing());
    }

    #[test]
    fn test_replay_seeks_then_plays() {
        let (mut controller, observer) = controller_with_observer();
        controller.load(&[1, 2, 3]).unwrap();
        controller.play();
        assert!(!observer.is_at_start());

        controller.replay();
        assert!(controller.is_playing());
    }

    #[test]
    fn test_rewind_pauses_at_start() {
        let (mut controller, observer) = controller_with_observer();
        controller.load(&[1, 2, 3]).unwrap();
        controller.play();

        controller.rewind();
        assert!(!controller.is_playing());
        assert!(observer.is_at_start());
    }

    #[test]
    fn test_subscribe_observes_transitions() {
        let (mut controller, _) = controller_with_observer();
        let rx = controller.subscribe();
        controller.load(&[1, 2, 3]).unwrap();

        controller.play();
        assert!(*rx.borrow());

        controller.pause();
        assert!(!*rx.borrow());
    }

    #[test]
    fn test_new_load_resets_playing_flag() {
        let (mut controller, observer) = controller_with_observer();
        let rx = controller.subscribe();
        controller.load(&[1, 2, 3]).unwrap();
        controller.play();
        assert!(*rx.borrow());

        // A replacing load must not leave the old clip's playing state
        // observable.
        controller.load(&[4, 5, 6]).unwrap();
        assert!(!*rx.borrow());
        assert!(!controller.is_playing());
        assert_eq!(observer.load_count(), 2);
    }

    #[test]
    fn test_release_clears_clip() {
        let (mut controller, observer) = controller_with_observer();
        controller.load(&[1, 2, 3]).unwrap();
        controller.play();

        controller.release();
        assert!(!controller.has_clip());
        assert!(!observer.is_loaded());
    }

    #[test]
    fn test_drop_releases_clip() {
        let output = MockAudioOutput::new();
        let observer = output.clone();
        {
            let mut controller = PlaybackController::new(Box::new(output));
            controller.load(&[1, 2, 3]).unwrap();
            controller.play();
        }
        assert!(!observer.is_loaded());
        assert!(!observer.is_playing());
    }
}
