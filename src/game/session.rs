//! Staring-session state machine.
//!
//! Drives the game lifecycle off gaze-change edges and player commands,
//! and owns the elapsed-time stopwatch that becomes the final score.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::game::stopwatch::Stopwatch;
use crate::vision::tracker::GazeState;

/// Lifecycle state of a staring session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Waiting for the player to start.
    #[default]
    Idle,
    /// The staring contest is on; the clock is running.
    Running,
    /// The player looked away; terminal until reset.
    Ended,
}

impl SessionState {
    /// Returns a human-readable description of the state.
    pub fn description(&self) -> &'static str {
        match self {
            SessionState::Idle => "Waiting for start",
            SessionState::Running => "Staring contest in progress",
            SessionState::Ended => "Game over",
        }
    }

    /// Returns whether the session clock advances in this state.
    pub fn is_timed(&self) -> bool {
        matches!(self, SessionState::Running)
    }
}

/// Events that can drive a session transition.
#[derive(Debug, Clone, Copy)]
pub enum SessionEvent {
    /// Player command: start a new session.
    Start,
    /// Player command: clear the session back to idle. Safe in any state.
    Reset,
    /// The classifier published a gaze-state edge.
    GazeChanged(GazeState),
}

/// Reason a transition fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionReason {
    /// Player started the session.
    Started,
    /// Gaze left the centered band with eyes open.
    GazeAverted,
    /// Eyes closed while the strict blink rule is active.
    EyesClosed,
    /// Player reset the session.
    Reset,
}

/// Result of a session transition.
#[derive(Debug, Clone, Copy)]
pub struct TransitionResult {
    /// State after the transition.
    pub new_state: SessionState,
    /// Why the transition fired.
    pub reason: TransitionReason,
    /// Final score, set when the transition entered `Ended`.
    pub final_elapsed: Option<Duration>,
}

/// Session state machine with its elapsed-time stopwatch.
///
/// Gaze events only matter while `Running`; commands follow the lifecycle
/// (`Start` from `Idle`, `Reset` from anywhere). Everything else is ignored
/// and logged, never fatal.
pub struct SessionStateMachine {
    state: SessionState,
    stopwatch: Stopwatch,
    /// Frozen score after the session ended.
    final_elapsed: Option<Duration>,
    /// When set, a pure-blink edge also ends the session (the strict
    /// variant; by default natural blinks keep the game alive).
    end_on_blink: bool,
}

impl SessionStateMachine {
    /// Creates a machine in `Idle` with the permissive blink rule.
    pub fn new() -> Self {
        Self::with_blink_rule(false)
    }

    /// Creates a machine in `Idle` with the given blink rule.
    pub fn with_blink_rule(end_on_blink: bool) -> Self {
        Self {
            state: SessionState::Idle,
            stopwatch: Stopwatch::new(),
            final_elapsed: None,
            end_on_blink,
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns whether the strict blink rule is active.
    pub fn ends_on_blink(&self) -> bool {
        self.end_on_blink
    }

    /// Returns the elapsed time for the current session.
    ///
    /// While `Running` this advances with the clock; after `Ended` it is the
    /// frozen final score; in `Idle` it is zero.
    pub fn elapsed(&self) -> Duration {
        match self.state {
            SessionState::Idle => Duration::ZERO,
            SessionState::Running => self.stopwatch.read(),
            SessionState::Ended => self.final_elapsed.unwrap_or_default(),
        }
    }

    /// Processes an event, returning the transition if one fired.
    ///
    /// Returns `None` for events that do not apply in the current state;
    /// those are logged and ignored.
    pub fn process_event(&mut self, event: SessionEvent) -> Option<TransitionResult> {
        let transition = match (self.state, event) {
            (SessionState::Idle, SessionEvent::Start) => Some(TransitionResult {
                new_state: SessionState::Running,
                reason: TransitionReason::Started,
                final_elapsed: None,
            }),

            (SessionState::Running, SessionEvent::GazeChanged(gaze)) => {
                self.evaluate_gaze(gaze)
            }

            // Reset is a cancellation command and must be safe anywhere.
            (_, SessionEvent::Reset) => Some(TransitionResult {
                new_state: SessionState::Idle,
                reason: TransitionReason::Reset,
                final_elapsed: None,
            }),

            (state, SessionEvent::Start) => {
                tracing::warn!("Ignoring start command in {:?} state", state);
                None
            }

            // Gaze edges outside Running carry no meaning for the lifecycle.
            (_, SessionEvent::GazeChanged(_)) => None,
        };

        if let Some(ref result) = transition {
            self.apply_transition(result);
        }

        transition
    }

    /// Decides whether a gaze edge ends a running session.
    fn evaluate_gaze(&self, gaze: GazeState) -> Option<TransitionResult> {
        if gaze.is_gazing {
            // Still locked on; keep the clock moving.
            return None;
        }

        if gaze.is_blinking && !self.end_on_blink {
            // A natural blink is not looking away.
            return None;
        }

        let reason = if gaze.is_blinking {
            TransitionReason::EyesClosed
        } else {
            TransitionReason::GazeAverted
        };

        Some(TransitionResult {
            new_state: SessionState::Ended,
            reason,
            final_elapsed: Some(self.stopwatch.read()),
        })
    }

    /// Applies a transition, updating the stopwatch and internal state.
    fn apply_transition(&mut self, result: &TransitionResult) {
        let previous = self.state;
        self.state = result.new_state;

        match result.new_state {
            SessionState::Running => {
                self.stopwatch.reset();
                self.stopwatch.start();
                self.final_elapsed = None;
            }
            SessionState::Ended => {
                self.stopwatch.stop();
                self.final_elapsed = Some(result.final_elapsed.unwrap_or(self.stopwatch.read()));
            }
            SessionState::Idle => {
                self.stopwatch.reset();
                self.final_elapsed = None;
            }
        }

        tracing::info!(
            "Session transition: {:?} -> {:?} (reason: {:?})",
            previous,
            result.new_state,
            result.reason
        );
    }
}

impl Default for SessionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
