//! Dicta Services crate - collaborator contracts for the session engine.
//!
//! The engine talks to three external collaborators: a speech synthesizer
//! (text in, audio bytes out), an attempt sink (transcript in, authoritative
//! score out), and a passage catalog (lookup before a session starts). Each
//! is a transport-agnostic trait here, plus in-process implementations that
//! make the whole pipeline runnable and testable without a network.

pub mod catalog;
pub mod submission;
pub mod synthesis;

pub use catalog::{InMemoryCatalog, PassageCatalog};
pub use submission::{AttemptSink, FailingAttemptSink, InMemoryAttemptSink};
pub use synthesis::{FailingSynthesizer, SpeechSynthesizer, ToneSynthesizer};
