//! Game manager: the composition root of the staring contest.
//!
//! Owns the gaze tracker and the session state machine, wires the two
//! together (one classification pass and at most one lifecycle transition
//! per frame), and fans state changes out to subscribers over channels.
//! Feedback effects (music, overlays, score submission) live with the
//! subscribers, not here.

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::Config;
use crate::game::session::{
    SessionEvent, SessionState, SessionStateMachine, TransitionReason, TransitionResult,
};
use crate::game::stopwatch::format_elapsed;
use crate::vision::frame_slot::FrameSlot;
use crate::vision::tracker::{GazeChange, GazeConfig, GazeConfigError, GazeState, GazeTracker};
use crate::vision::LandmarkFrame;

/// Session change notification delivered to subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionChange {
    /// State before the transition.
    pub previous_state: SessionState,
    /// State after the transition.
    pub new_state: SessionState,
    /// Why the transition fired.
    pub reason: TransitionReason,
    /// Final score, present when the session just ended.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_elapsed: Option<Duration>,
    /// State description for display.
    pub description: String,
}

/// Point-in-time snapshot of the whole game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStatus {
    /// Current session lifecycle state.
    pub session_state: SessionState,
    /// Currently published gaze state.
    pub gaze_state: GazeState,
    /// Elapsed time of the current (or just-ended) session.
    pub elapsed: Duration,
    /// Elapsed time formatted as `HH:MM:SS.cc`.
    pub elapsed_display: String,
    /// Whether the strict blink rule is active.
    pub end_on_blink: bool,
}

/// Owns and wires the classifier, session machine, and subscribers.
pub struct GameManager {
    tracker: GazeTracker,
    session: SessionStateMachine,
    gaze_subscribers: Vec<Sender<GazeChange>>,
    session_subscribers: Vec<Sender<SessionChange>>,
}

impl GameManager {
    /// Creates a manager with the given classification config and blink rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the classification config is invalid.
    pub fn new(gaze: GazeConfig, end_on_blink: bool) -> Result<Self, GazeConfigError> {
        Ok(Self {
            tracker: GazeTracker::new(gaze)?,
            session: SessionStateMachine::with_blink_rule(end_on_blink),
            gaze_subscribers: Vec::new(),
            session_subscribers: Vec::new(),
        })
    }

    /// Creates a manager from the application configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured gaze parameters are invalid.
    pub fn from_config(config: &Config) -> Result<Self, GazeConfigError> {
        Self::new(config.gaze, config.game.end_on_blink)
    }

    /// Creates a manager with default settings.
    pub fn with_defaults() -> Self {
        Self {
            tracker: GazeTracker::with_defaults(),
            session: SessionStateMachine::new(),
            gaze_subscribers: Vec::new(),
            session_subscribers: Vec::new(),
        }
    }

    /// Subscribes to edge-triggered gaze state changes.
    pub fn subscribe_gaze(&mut self) -> Receiver<GazeChange> {
        let (tx, rx) = unbounded();
        self.gaze_subscribers.push(tx);
        rx
    }

    /// Subscribes to session lifecycle changes.
    pub fn subscribe_session(&mut self) -> Receiver<SessionChange> {
        let (tx, rx) = unbounded();
        self.session_subscribers.push(tx);
        rx
    }

    /// Processes one landmark frame to completion.
    ///
    /// Runs classification, publishes a gaze edge if one occurred, and
    /// applies at most one session transition driven by that edge.
    pub fn process_frame(&mut self, frame: &LandmarkFrame) {
        let Some(change) = self.tracker.process_frame(frame) else {
            return;
        };

        self.broadcast_gaze(change);

        let previous_state = self.session.state();
        if let Some(result) = self
            .session
            .process_event(SessionEvent::GazeChanged(change.current))
        {
            self.broadcast_session(previous_state, &result);
        }
    }

    /// Drains the hand-off slot and processes the latest frame, if any.
    ///
    /// Returns `true` if a frame was processed.
    pub fn process_latest(&mut self, slot: &FrameSlot<LandmarkFrame>) -> bool {
        match slot.take() {
            Some(frame) => {
                self.process_frame(&frame);
                true
            }
            None => false,
        }
    }

    /// Starts a new session.
    ///
    /// Returns `true` if the session started; a start while already
    /// `Running` or after `Ended` is ignored.
    pub fn start_session(&mut self) -> bool {
        let previous_state = self.session.state();
        match self.session.process_event(SessionEvent::Start) {
            Some(result) => {
                self.broadcast_session(previous_state, &result);
                true
            }
            None => false,
        }
    }

    /// Resets the session back to `Idle`. Safe in any state.
    pub fn reset_session(&mut self) {
        let previous_state = self.session.state();
        if let Some(result) = self.session.process_event(SessionEvent::Reset) {
            self.broadcast_session(previous_state, &result);
        }
        self.tracker.reset();
    }

    /// Returns the elapsed time of the current session, pollable at any
    /// rendering cadence.
    pub fn current_elapsed(&self) -> Duration {
        self.session.elapsed()
    }

    /// Returns the current session state.
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Returns the currently published gaze state.
    pub fn gaze_state(&self) -> GazeState {
        self.tracker.state()
    }

    /// Returns a snapshot of the whole game.
    pub fn status(&self) -> GameStatus {
        let elapsed = self.session.elapsed();
        GameStatus {
            session_state: self.session.state(),
            gaze_state: self.tracker.state(),
            elapsed,
            elapsed_display: format_elapsed(elapsed),
            end_on_blink: self.session.ends_on_blink(),
        }
    }

    fn broadcast_gaze(&mut self, change: GazeChange) {
        // Disconnected receivers drop out of the fan-out list.
        self.gaze_subscribers.retain(|tx| tx.send(change).is_ok());
    }

    fn broadcast_session(&mut self, previous_state: SessionState, result: &TransitionResult) {
        let change = SessionChange {
            previous_state,
            new_state: result.new_state,
            reason: result.reason,
            final_elapsed: result.final_elapsed,
            description: result.new_state.description().to_string(),
        };

        if let Some(score) = result.final_elapsed {
            tracing::info!("Session ended with score {}", format_elapsed(score));
        }

        self.session_subscribers
            .retain(|tx| tx.send(change.clone()).is_ok());
    }
}

impl Default for GameManager {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::eye::{EyeIndices, LEFT_EYE, RIGHT_EYE};
    use crate::vision::frame::LANDMARK_COUNT;
    use crate::vision::geometry::Landmark;

    fn face_frame(openness: f64, left_iris: f64, right_iris: f64) -> LandmarkFrame {
        let mut points = vec![Landmark::default(); LANDMARK_COUNT];
        place_eye(&mut points, &LEFT_EYE, 0.30, openness, left_iris);
        place_eye(&mut points, &RIGHT_EYE, 0.60, openness, right_iris);
        LandmarkFrame::try_present(points).unwrap()
    }

    fn place_eye(
        points: &mut [Landmark],
        eye: &EyeIndices,
        center_x: f64,
        openness: f64,
        iris: f64,
    ) {
        let width = 0.1;
        let inner = Landmark::new(center_x + width / 2.0, 0.5, 0.0);
        let outer = Landmark::new(center_x - width / 2.0, 0.5, 0.0);
        let half_gap = openness * width / 2.0;

        points[eye.inner_corner] = inner;
        points[eye.outer_corner] = outer;
        points[eye.upper_lid[0]] = Landmark::new(center_x - 0.025, 0.5 - half_gap, 0.0);
        points[eye.lower_lid[0]] = Landmark::new(center_x - 0.025, 0.5 + half_gap, 0.0);
        points[eye.upper_lid[1]] = Landmark::new(center_x + 0.025, 0.5 - half_gap, 0.0);
        points[eye.lower_lid[1]] = Landmark::new(center_x + 0.025, 0.5 + half_gap, 0.0);
        points[eye.iris_center] = Landmark::new(inner.x + iris * (outer.x - inner.x), 0.5, 0.0);
    }

    fn centered() -> LandmarkFrame {
        face_frame(0.30, 0.50, 0.50)
    }

    fn averted() -> LandmarkFrame {
        face_frame(0.30, 0.80, 0.50)
    }

    fn blinking() -> LandmarkFrame {
        face_frame(0.10, 0.50, 0.50)
    }

    #[test]
    fn test_manager_starts_idle() {
        let manager = GameManager::with_defaults();
        assert_eq!(manager.state(), SessionState::Idle);
        assert_eq!(manager.current_elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let bad = GazeConfig {
            gaze_center_min: 0.9,
            gaze_center_max: 0.1,
            ..Default::default()
        };
        assert!(GameManager::new(bad, false).is_err());
    }

    #[test]
    fn test_start_session_once() {
        let mut manager = GameManager::with_defaults();
        assert!(manager.start_session());
        assert_eq!(manager.state(), SessionState::Running);
        // A second start is a no-op.
        assert!(!manager.start_session());
    }

    #[test]
    fn test_averted_frame_ends_running_session() {
        let mut manager = GameManager::with_defaults();
        manager.start_session();

        manager.process_frame(&centered());
        assert_eq!(manager.state(), SessionState::Running);

        manager.process_frame(&averted());
        assert_eq!(manager.state(), SessionState::Ended);
    }

    #[test]
    fn test_blink_edges_do_not_end_session() {
        let mut manager = GameManager::with_defaults();
        manager.start_session();

        manager.process_frame(&centered());
        manager.process_frame(&blinking());
        manager.process_frame(&centered());
        assert_eq!(manager.state(), SessionState::Running);
    }

    #[test]
    fn test_gaze_subscriber_sees_edges_only() {
        let mut manager = GameManager::with_defaults();
        let gaze_rx = manager.subscribe_gaze();
        manager.start_session();

        for _ in 0..5 {
            manager.process_frame(&centered());
        }
        manager.process_frame(&blinking());

        let events: Vec<_> = gaze_rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert!(events[0].current.is_gazing);
        assert!(events[1].current.is_blinking);
    }

    #[test]
    fn test_session_subscriber_receives_final_score() {
        let mut manager = GameManager::with_defaults();
        let session_rx = manager.subscribe_session();

        manager.start_session();
        manager.process_frame(&centered());
        manager.process_frame(&averted());

        let changes: Vec<_> = session_rx.try_iter().collect();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].new_state, SessionState::Running);
        assert_eq!(changes[1].new_state, SessionState::Ended);
        assert_eq!(changes[1].reason, TransitionReason::GazeAverted);
        assert!(changes[1].final_elapsed.is_some());
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let mut manager = GameManager::with_defaults();
        let rx = manager.subscribe_session();
        drop(rx);

        manager.start_session();
        assert!(manager.session_subscribers.is_empty());
    }

    #[test]
    fn test_reset_returns_to_idle_and_clears_gaze() {
        let mut manager = GameManager::with_defaults();
        manager.start_session();
        manager.process_frame(&centered());
        manager.process_frame(&averted());

        manager.reset_session();
        assert_eq!(manager.state(), SessionState::Idle);
        assert_eq!(manager.gaze_state(), GazeState::default());
        assert_eq!(manager.current_elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_process_latest_drains_slot() {
        let mut manager = GameManager::with_defaults();
        manager.start_session();

        let slot = FrameSlot::new();
        assert!(!manager.process_latest(&slot));

        // Only the newest frame matters: the centered frame is overwritten
        // by the averted one before processing.
        slot.publish(centered());
        slot.publish(averted());
        assert!(manager.process_latest(&slot));
        assert_eq!(manager.state(), SessionState::Ended);
        assert!(!manager.process_latest(&slot));
    }

    #[test]
    fn test_status_snapshot() {
        let mut manager = GameManager::with_defaults();
        manager.start_session();
        manager.process_frame(&centered());

        let status = manager.status();
        assert_eq!(status.session_state, SessionState::Running);
        assert!(status.gaze_state.is_gazing);
        assert!(!status.end_on_blink);
        assert_eq!(status.elapsed_display.len(), "00:00:00.00".len());
    }

    #[test]
    fn test_strict_blink_rule_from_config() {
        let mut config = Config::default();
        config.game.end_on_blink = true;
        let mut manager = GameManager::from_config(&config).unwrap();

        manager.start_session();
        manager.process_frame(&centered());
        manager.process_frame(&blinking());
        assert_eq!(manager.state(), SessionState::Ended);
    }
}
