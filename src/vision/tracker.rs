//! Gaze/blink classification from landmark frames.
//!
//! This module turns the noisy per-frame landmark stream into a discrete
//! gaze state and emits an event only when that state changes. Downstream
//! consumers (the game session, feedback, UI) therefore see edges, not a
//! firehose of identical per-frame samples.

use serde::{Deserialize, Serialize};

use crate::vision::eye::{
    eye_aspect_ratio, iris_horizontal_ratio, measure, EyeMetrics, LEFT_EYE, RIGHT_EYE,
};
use crate::vision::frame::LandmarkFrame;

/// Configuration for gaze/blink classification.
///
/// The defaults are tuned for a near-frontal webcam at typical desk
/// distance; both thresholds are domain heuristics rather than derivable
/// constants, so they are exposed for tuning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct GazeConfig {
    /// Average eye-aspect-ratio below which the eyes count as closed.
    ///
    /// Default: 0.25.
    pub ear_threshold: f64,

    /// Lower edge of the centered-gaze band for the iris ratio.
    ///
    /// Default: 0.40.
    pub gaze_center_min: f64,

    /// Upper edge of the centered-gaze band for the iris ratio.
    ///
    /// Default: 0.60.
    pub gaze_center_max: f64,
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            ear_threshold: 0.25,
            gaze_center_min: 0.40,
            gaze_center_max: 0.60,
        }
    }
}

impl GazeConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error for non-finite values, a non-positive blink
    /// threshold, or an inverted centered band. These are startup-time
    /// configuration mistakes, not per-frame conditions.
    pub fn validate(&self) -> Result<(), GazeConfigError> {
        if !self.ear_threshold.is_finite() || self.ear_threshold <= 0.0 {
            return Err(GazeConfigError::InvalidEarThreshold {
                value: self.ear_threshold,
            });
        }
        if !self.gaze_center_min.is_finite() || !self.gaze_center_max.is_finite() {
            return Err(GazeConfigError::InvalidCenterBand {
                min: self.gaze_center_min,
                max: self.gaze_center_max,
            });
        }
        if self.gaze_center_min >= self.gaze_center_max {
            return Err(GazeConfigError::InvalidCenterBand {
                min: self.gaze_center_min,
                max: self.gaze_center_max,
            });
        }
        Ok(())
    }

    /// Returns whether an iris ratio falls inside the centered band.
    fn in_center_band(&self, ratio: f64) -> bool {
        ratio >= self.gaze_center_min && ratio <= self.gaze_center_max
    }
}

/// Errors raised by invalid classification configuration.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GazeConfigError {
    /// The blink threshold must be finite and positive.
    #[error("Invalid eye-aspect-ratio threshold: {value}")]
    InvalidEarThreshold { value: f64 },

    /// The centered band must be a finite, non-empty interval.
    #[error("Invalid centered-gaze band: min {min} must be below max {max}")]
    InvalidCenterBand { min: f64, max: f64 },
}

/// Discrete gaze state published by the tracker.
///
/// `is_gazing` and `is_blinking` are mutually exclusive: a blink suppresses
/// the gaze-direction check entirely, since iris position is meaningless
/// behind a closed lid. An absent face is (false, false).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GazeState {
    /// Both irises are inside the centered band.
    pub is_gazing: bool,
    /// The averaged eye-aspect-ratio is below the blink threshold.
    pub is_blinking: bool,
}

/// Event emitted when the published gaze state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GazeChange {
    /// State before this frame.
    pub previous: GazeState,
    /// State from this frame onward.
    pub current: GazeState,
}

/// Status snapshot of the tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GazeTrackerStatus {
    /// Currently published state.
    pub state: GazeState,
    /// Active configuration.
    pub config: GazeConfig,
    /// Per-eye measurements from the last face-bearing frame, left then
    /// right. `None` until a face has been seen or while measurement is
    /// degenerate.
    pub last_metrics: Option<(EyeMetrics, EyeMetrics)>,
}

/// Gaze/blink classifier over the landmark-frame stream.
///
/// Classification is a pure function of the current frame; the only state
/// held here is the last published tuple (for edge detection) and the last
/// per-eye metrics (for the status surface).
pub struct GazeTracker {
    config: GazeConfig,
    state: GazeState,
    last_metrics: Option<(EyeMetrics, EyeMetrics)>,
}

impl GazeTracker {
    /// Creates a tracker with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid; see
    /// [`GazeConfig::validate`].
    pub fn new(config: GazeConfig) -> Result<Self, GazeConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            state: GazeState::default(),
            last_metrics: None,
        })
    }

    /// Creates a tracker with default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: GazeConfig::default(),
            state: GazeState::default(),
            last_metrics: None,
        }
    }

    /// Returns the currently published state.
    pub fn state(&self) -> GazeState {
        self.state
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &GazeConfig {
        &self.config
    }

    /// Returns a status snapshot.
    pub fn status(&self) -> GazeTrackerStatus {
        GazeTrackerStatus {
            state: self.state,
            config: self.config,
            last_metrics: self.last_metrics,
        }
    }

    /// Resets the published state to (false, false) and clears metrics.
    pub fn reset(&mut self) {
        self.state = GazeState::default();
        self.last_metrics = None;
    }

    /// Classifies one frame and returns a change event if the published
    /// (is_gazing, is_blinking) tuple moved.
    ///
    /// Identical consecutive classifications produce no event and no
    /// downstream work.
    pub fn process_frame(&mut self, frame: &LandmarkFrame) -> Option<GazeChange> {
        let next = self.classify(frame);
        self.publish(next)
    }

    /// Per-frame classification.
    fn classify(&mut self, frame: &LandmarkFrame) -> GazeState {
        let Some(landmarks) = frame.landmarks() else {
            return GazeState::default();
        };

        let left_ear = eye_aspect_ratio(landmarks, &LEFT_EYE);
        let right_ear = eye_aspect_ratio(landmarks, &RIGHT_EYE);
        let (Some(left_ear), Some(right_ear)) = (left_ear, right_ear) else {
            // Degenerate eye width: the ratio is undefined, so hold the
            // last published state rather than classify on garbage.
            return self.state;
        };

        self.last_metrics = measure(landmarks, &LEFT_EYE).zip(measure(landmarks, &RIGHT_EYE));

        let avg_ear = (left_ear + right_ear) / 2.0;
        if avg_ear < self.config.ear_threshold {
            // Eyes closed: iris position is meaningless, skip the gaze check.
            return GazeState {
                is_gazing: false,
                is_blinking: true,
            };
        }

        let left_ratio = iris_horizontal_ratio(landmarks, &LEFT_EYE);
        let right_ratio = iris_horizontal_ratio(landmarks, &RIGHT_EYE);
        let (Some(left_ratio), Some(right_ratio)) = (left_ratio, right_ratio) else {
            return self.state;
        };

        // Both eyes must independently sit in the centered band.
        let centered =
            self.config.in_center_band(left_ratio) && self.config.in_center_band(right_ratio);

        GazeState {
            is_gazing: centered,
            is_blinking: false,
        }
    }

    /// Publishes a classification, emitting an event only on change.
    fn publish(&mut self, next: GazeState) -> Option<GazeChange> {
        if next == self.state {
            return None;
        }

        let change = GazeChange {
            previous: self.state,
            current: next,
        };
        self.state = next;

        tracing::debug!(
            "Gaze state change: gazing {} -> {}, blinking {} -> {}",
            change.previous.is_gazing,
            change.current.is_gazing,
            change.previous.is_blinking,
            change.current.is_blinking
        );

        Some(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::eye::EyeIndices;
    use crate::vision::frame::LANDMARK_COUNT;
    use crate::vision::geometry::Landmark;

    /// Builds a face-bearing frame with both eyes laid out for the given
    /// (openness, iris ratio) pairs.
    fn face_frame(left: (f64, f64), right: (f64, f64)) -> LandmarkFrame {
        let mut points = vec![Landmark::default(); LANDMARK_COUNT];
        place_eye(&mut points, &LEFT_EYE, 0.30, left.0, left.1);
        place_eye(&mut points, &RIGHT_EYE, 0.60, right.0, right.1);
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

    #[test]
    fn test_default_config_values() {
        let config = GazeConfig::default();
        assert_eq!(config.ear_threshold, 0.25);
        assert_eq!(config.gaze_center_min, 0.40);
        assert_eq!(config.gaze_center_max, 0.60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inverted_band_is_rejected() {
        let config = GazeConfig {
            gaze_center_min: 0.7,
            gaze_center_max: 0.3,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(GazeConfigError::InvalidCenterBand { .. })
        ));
        assert!(GazeTracker::new(config).is_err());
    }

    #[test]
    fn test_non_positive_threshold_is_rejected() {
        let config = GazeConfig {
            ear_threshold: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(GazeConfigError::InvalidEarThreshold { .. })
        ));
    }

    #[test]
    fn test_absent_frame_classifies_inactive() {
        let mut tracker = GazeTracker::with_defaults();
        let change = tracker.process_frame(&LandmarkFrame::Absent);
        // Initial state is already (false, false): no edge.
        assert!(change.is_none());
        assert_eq!(tracker.state(), GazeState::default());
    }

    #[test]
    fn test_centered_open_eyes_classify_gazing() {
        let mut tracker = GazeTracker::with_defaults();
        let frame = face_frame((0.30, 0.50), (0.30, 0.48));

        let change = tracker.process_frame(&frame).unwrap();
        assert_eq!(
            change.current,
            GazeState {
                is_gazing: true,
                is_blinking: false
            }
        );
    }

    #[test]
    fn test_low_ear_classifies_blinking_regardless_of_iris() {
        let mut tracker = GazeTracker::with_defaults();
        let frame = face_frame((0.10, 0.50), (0.10, 0.48));

        let change = tracker.process_frame(&frame).unwrap();
        assert_eq!(
            change.current,
            GazeState {
                is_gazing: false,
                is_blinking: true
            }
        );
    }

    #[test]
    fn test_averted_iris_classifies_inactive() {
        let mut tracker = GazeTracker::with_defaults();

        // Establish a gazing state first so the averted frame produces an edge.
        tracker.process_frame(&face_frame((0.30, 0.50), (0.30, 0.50)));

        // One eye looking hard toward the outer corner.
        let change = tracker
            .process_frame(&face_frame((0.30, 0.80), (0.30, 0.50)))
            .unwrap();
        assert_eq!(
            change.current,
            GazeState {
                is_gazing: false,
                is_blinking: false
            }
        );
    }

    #[test]
    fn test_both_eyes_must_be_centered() {
        let mut tracker = GazeTracker::with_defaults();
        // Left centered, right just outside the band.
        let change = tracker.process_frame(&face_frame((0.30, 0.50), (0.30, 0.61)));
        assert!(change.is_none());
        assert!(!tracker.state().is_gazing);
    }

    #[test]
    fn test_band_edges_are_inclusive() {
        let mut tracker = GazeTracker::with_defaults();
        let change = tracker
            .process_frame(&face_frame((0.30, 0.40), (0.30, 0.60)))
            .unwrap();
        assert!(change.current.is_gazing);
    }

    #[test]
    fn test_edge_triggered_emission_only() {
        let mut tracker = GazeTracker::with_defaults();
        let frame = face_frame((0.30, 0.50), (0.30, 0.50));

        assert!(tracker.process_frame(&frame).is_some());
        // Identical frames: no further events.
        for _ in 0..10 {
            assert!(tracker.process_frame(&frame).is_none());
        }

        // Losing the face is one edge.
        assert!(tracker.process_frame(&LandmarkFrame::Absent).is_some());
        assert!(tracker.process_frame(&LandmarkFrame::Absent).is_none());
    }

    #[test]
    fn test_blink_implies_not_gazing() {
        let mut tracker = GazeTracker::with_defaults();
        for iris in [0.0, 0.3, 0.5, 0.7, 1.2] {
            if let Some(change) = tracker.process_frame(&face_frame((0.05, iris), (0.05, iris))) {
                assert!(!change.current.is_gazing);
                assert!(change.current.is_blinking);
            }
            assert!(!tracker.state().is_gazing);
        }
    }

    #[test]
    fn test_degenerate_eye_width_holds_last_state() {
        let mut tracker = GazeTracker::with_defaults();

        // Blink first so the held state is distinctive.
        tracker.process_frame(&face_frame((0.10, 0.50), (0.10, 0.50)));
        assert!(tracker.state().is_blinking);

        // Collapse one eye to zero width: ratios undefined, state held,
        // no event.
        let mut points = vec![Landmark::default(); LANDMARK_COUNT];
        place_eye(&mut points, &RIGHT_EYE, 0.60, 0.30, 0.50);
        let collapsed = LandmarkFrame::try_present(points).unwrap();
        assert!(tracker.process_frame(&collapsed).is_none());
        assert!(tracker.state().is_blinking);
    }

    #[test]
    fn test_reset_clears_published_state() {
        let mut tracker = GazeTracker::with_defaults();
        tracker.process_frame(&face_frame((0.30, 0.50), (0.30, 0.50)));
        assert!(tracker.state().is_gazing);

        tracker.reset();
        assert_eq!(tracker.state(), GazeState::default());
        assert!(tracker.status().last_metrics.is_none());
    }

    #[test]
    fn test_status_reports_last_metrics() {
        let mut tracker = GazeTracker::with_defaults();
        tracker.process_frame(&face_frame((0.30, 0.50), (0.30, 0.48)));

        let status = tracker.status();
        let (left, right) = status.last_metrics.unwrap();
        assert!((left.openness_ratio - 0.30).abs() < 1e-9);
        assert!((right.iris_horizontal_ratio - 0.48).abs() < 1e-9);
    }
}
