//! Dicta Session crate - the dictation practice session engine.
//!
//! Drives one practice attempt through a strict phase machine:
//! Loading -> Listening -> Typing -> Completed. The engine owns the audio
//! playback resource for its lifetime, captures the transcript during the
//! typing phase, stamps start/end times, and emits an `AttemptResult` on
//! completion. Completed is terminal; restarting means constructing a new
//! session.

pub mod engine;
pub mod phase;

pub use engine::{LoadToken, SessionEngine, SessionOptions};
pub use phase::Phase;
