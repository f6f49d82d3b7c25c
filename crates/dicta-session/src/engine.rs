//! Session engine managing the full practice lifecycle.
//!
//! The `SessionEngine` orchestrates one attempt against one passage: it
//! requests audio from the synthesizer, exposes the playback controller
//! during the listening phase, captures the transcript during typing, and
//! produces an `AttemptResult` on completion. All operations are in-memory
//! phase transitions; the only suspending operation is the audio load, which
//! is guarded by a liveness token so a result arriving after teardown is
//! dropped instead of mutating a dead session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use dicta_audio::PlaybackController;
use dicta_core::error::{DictaError, Result};
use dicta_core::score;
use dicta_core::types::{AttemptReceipt, AttemptResult, Passage, SessionStats};
use dicta_services::{AttemptSink, SpeechSynthesizer};

use crate::phase::{Phase, PhaseMachine};

/// Per-session behavior switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    /// Complete the session automatically once the transcript reaches the
    /// passage length, instead of waiting for an explicit `complete`.
    pub auto_complete_on_length: bool,
}

/// Liveness snapshot handed out before an audio load is started.
///
/// The load path must present its token back to [`SessionEngine::apply_audio`];
/// a token whose session has been cancelled (or dropped) is dead, and the
/// late-arriving payload is discarded without any state change.
#[derive(Debug, Clone)]
pub struct LoadToken {
    session_id: Uuid,
    alive: Arc<AtomicBool>,
}

impl LoadToken {
    /// Whether the owning session is still accepting the load result.
    pub fn is_live(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }
}

/// The dictation practice session engine.
///
/// Owns exactly one playback resource and one transcript. Mistimed
/// operations (input outside the typing phase, a second `complete`) are
/// silently ignored and logged at debug; the engine has no fatal error path
/// of its own.
pub struct SessionEngine {
    id: Uuid,
    passage: Passage,
    options: SessionOptions,
    phase: PhaseMachine,
    typed_text: String,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    audio: PlaybackController,
    alive: Arc<AtomicBool>,
}

impl SessionEngine {
    /// Create a session for one passage, starting in the `Loading` phase.
    ///
    /// The engine takes ownership of the playback controller; the resource
    /// is released on cancel and on drop.
    pub fn new(passage: Passage, options: SessionOptions, audio: PlaybackController) -> Self {
        let id = Uuid::new_v4();
        tracing::info!(
            session_id = %id,
            passage_id = passage.id,
            language = %passage.language,
            "Practice session created"
        );
        Self {
            id,
            passage,
            options,
            phase: PhaseMachine::new(),
            typed_text: String::new(),
            start_time: None,
            end_time: None,
            audio,
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Unique identifier of this session instance.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The passage being practiced.
    pub fn passage(&self) -> &Passage {
        &self.passage
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase.current()
    }

    /// The transcript as typed so far.
    pub fn typed_text(&self) -> &str {
        &self.typed_text
    }

    /// Playback controls, for the caller's UI.
    pub fn audio(&self) -> &PlaybackController {
        &self.audio
    }

    /// Mutable playback controls (play/pause/replay are `&mut`).
    pub fn audio_mut(&mut self) -> &mut PlaybackController {
        &mut self.audio
    }

    /// Take a liveness token for an audio load about to be started.
    pub fn load_token(&self) -> LoadToken {
        LoadToken {
            session_id: self.id,
            alive: Arc::clone(&self.alive),
        }
    }

    /// Apply the outcome of an audio load.
    ///
    /// Audio is best-effort: both a synthesis failure and an undecodable
    /// payload are logged and the session still advances to `Listening`.
    /// A stale token (cancelled session, or a token from another session)
    /// drops the payload without touching any state.
    pub fn apply_audio(&mut self, token: &LoadToken, payload: Result<Vec<u8>>) {
        if !token.is_live() || token.session_id != self.id {
            tracing::debug!(
                session_id = %token.session_id,
                "Stale audio result dropped"
            );
            return;
        }
        if self.phase.current() != Phase::Loading {
            tracing::debug!(
                session_id = %self.id,
                phase = %self.phase.current(),
                "Audio result ignored outside the loading phase"
            );
            return;
        }

        match payload {
            Ok(bytes) => match self.audio.load(&bytes) {
                Ok(()) => {
                    tracing::info!(
                        session_id = %self.id,
                        bytes = bytes.len(),
                        "Dictation audio ready"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        session_id = %self.id,
                        error = %e,
                        "Audio load failed; continuing without audio"
                    );
                }
            },
            Err(e) => {
                tracing::warn!(
                    session_id = %self.id,
                    error = %e,
                    "Audio synthesis failed; continuing without audio"
                );
            }
        }

        self.phase.transition(Phase::Listening);
    }

    /// Request audio for the passage and advance to `Listening`.
    ///
    /// Composed convenience over [`load_token`] / [`apply_audio`] for the
    /// common single-task flow.
    ///
    /// [`load_token`]: Self::load_token
    /// [`apply_audio`]: Self::apply_audio
    pub async fn load_audio<S: SpeechSynthesizer>(&mut self, synthesizer: &S) {
        let token = self.load_token();
        let payload = synthesizer.synthesize(&self.passage.content).await;
        self.apply_audio(&token, payload);
    }

    /// Leave listening and start transcribing.
    ///
    /// Entry actions: pause and rewind the audio, stamp `start_time`, clear
    /// the transcript. Ignored outside `Listening`.
    pub fn start_typing(&mut self) {
        if !self.is_live() {
            return;
        }
        if !self.phase.transition(Phase::Typing) {
            return;
        }
        self.audio.rewind();
        self.start_time = Some(Utc::now());
        self.typed_text.clear();
        tracing::info!(session_id = %self.id, "Typing phase started");
    }

    /// Replace the transcript with the caller's full current text.
    ///
    /// Total-replacement semantics: the caller supplies the whole text every
    /// time, not a delta. Ignored outside the `Typing` phase.
    pub fn handle_input(&mut self, text: &str) {
        if !self.is_live() || self.phase.current() != Phase::Typing {
            tracing::debug!(session_id = %self.id, "Input ignored outside the typing phase");
            return;
        }
        self.typed_text.clear();
        self.typed_text.push_str(text);

        if self.options.auto_complete_on_length
            && self.typed_text.chars().count() >= self.passage.char_count()
        {
            self.complete();
        }
    }

    /// Finish the attempt, freezing the transcript and the clock.
    ///
    /// Returns the attempt result, or `None` if the session was not in the
    /// `Typing` phase. `Completed` is terminal; the result stays available
    /// through [`result`] so a failed submission can be retried.
    ///
    /// [`result`]: Self::result
    pub fn complete(&mut self) -> Option<AttemptResult> {
        if !self.is_live() {
            return None;
        }
        if !self.phase.transition(Phase::Completed) {
            return None;
        }
        self.end_time = Some(Utc::now());
        self.audio.pause();
        tracing::info!(
            session_id = %self.id,
            elapsed_seconds = self.elapsed_seconds(),
            typed_chars = self.typed_text.chars().count(),
            "Session completed"
        );
        self.result()
    }

    /// The attempt result, available while (and only while) completed.
    pub fn result(&self) -> Option<AttemptResult> {
        if self.phase.current() != Phase::Completed {
            return None;
        }
        Some(AttemptResult {
            passage_id: self.passage.id,
            typed_text: self.typed_text.clone(),
            elapsed_seconds: self.elapsed_seconds(),
        })
    }

    /// Submit the completed attempt to the sink.
    ///
    /// Fails with [`DictaError::Session`] before completion and passes
    /// through [`DictaError::Submission`] from the sink; in both cases the
    /// session and its transcript are left untouched for a retry.
    pub async fn submit<S: AttemptSink>(&self, sink: &S) -> Result<AttemptReceipt> {
        let result = self
            .result()
            .ok_or_else(|| DictaError::Session("session is not completed".to_string()))?;
        sink.submit(&result).await
    }

    /// Tear down the session without emitting a result.
    ///
    /// Releases the audio resource and marks the session dead so in-flight
    /// audio loads are suppressed. Allowed from any phase; idempotent.
    pub fn cancel(&mut self) {
        if !self.alive.swap(false, Ordering::Relaxed) {
            return;
        }
        self.audio.release();
        tracing::info!(
            session_id = %self.id,
            phase = %self.phase.current(),
            "Session cancelled"
        );
    }

    /// Seconds elapsed in the typing phase, sampled on demand.
    ///
    /// Live (keeps advancing) until completion fixes `end_time`; zero before
    /// typing starts.
    pub fn elapsed_seconds(&self) -> f64 {
        let Some(start) = self.start_time else {
            return 0.0;
        };
        let end = self.end_time.unwrap_or_else(Utc::now);
        (end - start).num_milliseconds() as f64 / 1000.0
    }

    /// Advisory client-side stats snapshot for live display.
    pub fn stats(&self) -> SessionStats {
        let elapsed = self.elapsed_seconds();
        SessionStats {
            accuracy: score::accuracy(&self.passage.content, &self.typed_text),
            wpm: score::wpm(&self.typed_text, elapsed / 60.0),
            progress: score::progress(&self.typed_text, &self.passage.content),
            elapsed_seconds: elapsed,
        }
    }

    fn is_live(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }
}

impl Drop for SessionEngine {
    fn drop(&mut self) {
        // Suppress any in-flight audio load; the controller's own Drop
        // releases the playback resource.
        self.alive.store(false, Ordering::Relaxed);
    }
}

// =============================================================================
// Tests
// =============================================================================
