//! Session phase machine.
//!
//! Enforces valid phase transitions for the practice lifecycle:
//! - Loading -> Listening (audio ready, or audio given up on)
//! - Listening -> Typing (user is ready to transcribe)
//! - Typing -> Completed (explicit submit or length-based auto-complete)
//!
//! Completed is terminal. Cancellation is not a phase: a cancelled session
//! is torn down, not transitioned.

use std::fmt;

/// Stage of a practice session in the listen/type/complete lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Fetching and decoding the passage audio.
    Loading,
    /// Audio controls are live; the user listens and replays at will.
    Listening,
    /// The user is transcribing; the clock is running.
    Typing,
    /// The transcript is frozen and the result is available.
    Completed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Loading => write!(f, "Loading"),
            Phase::Listening => write!(f, "Listening"),
            Phase::Typing => write!(f, "Typing"),
            Phase::Completed => write!(f, "Completed"),
        }
    }
}

impl Phase {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &Phase) -> bool {
        matches!(
            (self, target),
            (Phase::Loading, Phase::Listening)
                | (Phase::Listening, Phase::Typing)
                | (Phase::Typing, Phase::Completed)
        )
    }
}

/// Phase holder applying validated transitions.
///
/// Invalid transitions are ignored rather than raised — the UI is expected
/// to gate controls by phase, so a mistimed invocation is logged at debug
/// and dropped.
#[derive(Debug)]
pub struct PhaseMachine {
    current: Phase,
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseMachine {
    /// Create a new phase machine in `Loading`.
    pub fn new() -> Self {
        Self {
            current: Phase::Loading,
        }
    }

    /// Returns the current phase.
    pub fn current(&self) -> Phase {
        self.current
    }

    /// Attempt to transition to the target phase.
    ///
    /// Returns `true` if the transition was applied, `false` if it was
    /// ignored as invalid from the current phase.
    pub fn transition(&mut self, target: Phase) -> bool {
        if self.current.can_transition_to(&target) {
            tracing::debug!("Session phase: {} -> {}", self.current, target);
            self.current = target;
            true
        } else {
            tracing::debug!(
                "Ignored invalid phase transition: {} -> {}",
                self.current,
                target
            );
            false
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
