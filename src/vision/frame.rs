//! Landmark frame type produced by the external face-mesh extractor.
//!
//! A frame is either `Absent` (no face in view) or `Present` with the full
//! refined face-mesh topology of 478 points. Presence is validated at
//! construction so that every index the eye estimators use is guaranteed to
//! be in range downstream.

use serde::{Deserialize, Serialize};

use crate::vision::geometry::Landmark;

/// Number of points in the refined face-mesh topology (iris tracking on).
pub const LANDMARK_COUNT: usize = 478;

/// Errors raised when building a frame from extractor output.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FrameError {
    /// The extractor delivered a landmark list of the wrong length.
    #[error("Invalid landmark count: expected {expected}, got {actual}")]
    InvalidLandmarkCount { expected: usize, actual: usize },
}

/// One frame of face-mesh output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum LandmarkFrame {
    /// No face was detected in this frame.
    #[default]
    Absent,
    /// A face was detected; contains exactly [`LANDMARK_COUNT`] points.
    Present(Vec<Landmark>),
}

impl LandmarkFrame {
    /// Builds a `Present` frame, failing fast on a malformed landmark list.
    ///
    /// # Errors
    ///
    /// Returns an error if `landmarks` does not contain exactly
    /// [`LANDMARK_COUNT`] points.
    pub fn try_present(landmarks: Vec<Landmark>) -> Result<Self, FrameError> {
        if landmarks.len() != LANDMARK_COUNT {
            return Err(FrameError::InvalidLandmarkCount {
                expected: LANDMARK_COUNT,
                actual: landmarks.len(),
            });
        }
        Ok(Self::Present(landmarks))
    }

    /// Builds a frame from raw extractor output, degrading malformed input
    /// to `Absent`.
    ///
    /// Extraction errors are per-frame and self-heal on the next frame, so a
    /// bad landmark list is logged and treated as "no face" rather than
    /// aborting the classification loop.
    pub fn from_detection(landmarks: Option<Vec<Landmark>>) -> Self {
        match landmarks {
            None => Self::Absent,
            Some(points) => Self::try_present(points).unwrap_or_else(|e| {
                tracing::warn!("Discarding malformed landmark frame: {}", e);
                Self::Absent
            }),
        }
    }

    /// Returns the landmark list if a face is present.
    pub fn landmarks(&self) -> Option<&[Landmark]> {
        match self {
            Self::Absent => None,
            Self::Present(points) => Some(points),
        }
    }

    /// Returns whether a face was detected in this frame.
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }
}
