//! Per-eye openness and iris-position estimators.
//!
//! Both estimators work on the refined face-mesh topology: six contour
//! points per eye for the aspect ratio, plus the iris-center point for the
//! horizontal gaze ratio. The aspect ratio (EAR) is a cheap blink proxy:
//! vertical lid distances collapse toward zero as the eye closes while the
//! horizontal width stays put. The iris ratio is a 2D positional heuristic
//! that assumes a near-frontal camera; it makes no attempt at 3D head-pose
//! compensation.

use serde::{Deserialize, Serialize};

use crate::vision::geometry::{distance, Landmark};

/// Eye width below which ratio denominators are considered degenerate.
///
/// At widths this small (normalized coordinates) the eye is occluded or the
/// detection has collapsed, and any ratio would be numeric garbage.
const MIN_EYE_WIDTH: f64 = 1e-6;

/// Landmark indices describing one eye in the refined face-mesh topology.
///
/// `upper_lid[i]` pairs vertically with `lower_lid[i]`; the aspect ratio
/// depends on that pairing, not on the raw index order.
#[derive(Debug, Clone, Copy)]
pub struct EyeIndices {
    /// Corner nearest the temple.
    pub outer_corner: usize,
    /// Corner nearest the nose bridge.
    pub inner_corner: usize,
    /// Two points along the upper eyelid.
    pub upper_lid: [usize; 2],
    /// Two points along the lower eyelid, paired element-wise with `upper_lid`.
    pub lower_lid: [usize; 2],
    /// Iris-center point (only present with iris refinement enabled).
    pub iris_center: usize,
}

/// The left eye contour and iris of the refined face-mesh topology.
pub const LEFT_EYE: EyeIndices = EyeIndices {
    outer_corner: 33,
    inner_corner: 133,
    upper_lid: [160, 158],
    lower_lid: [144, 153],
    iris_center: 468,
};

/// The right eye contour and iris of the refined face-mesh topology.
pub const RIGHT_EYE: EyeIndices = EyeIndices {
    outer_corner: 263,
    inner_corner: 362,
    upper_lid: [385, 387],
    lower_lid: [380, 373],
    iris_center: 473,
};

/// Transient per-eye measurements for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeMetrics {
    /// Eye aspect ratio; low values indicate a closed eye.
    pub openness_ratio: f64,
    /// Horizontal iris position between the corners; 0 = inner, 1 = outer.
    pub iris_horizontal_ratio: f64,
}

/// Computes the eye aspect ratio for one eye.
///
/// EAR = (|upper0 − lower0| + |upper1 − lower1|) / (2 · |outer − inner|).
///
/// Returns `None` when the eye width is degenerate; callers should hold
/// their previous blink state for that frame instead of classifying on a
/// near-zero denominator.
pub fn eye_aspect_ratio(landmarks: &[Landmark], eye: &EyeIndices) -> Option<f64> {
    let width = eye_width(landmarks, eye)?;

    let vertical_a = distance(
        &landmarks[eye.upper_lid[0]],
        &landmarks[eye.lower_lid[0]],
    );
    let vertical_b = distance(
        &landmarks[eye.upper_lid[1]],
        &landmarks[eye.lower_lid[1]],
    );

    Some((vertical_a + vertical_b) / (2.0 * width))
}

/// Computes the horizontal iris position for one eye.
///
/// The ratio is the iris-center's distance from the inner corner over the
/// eye width: nominally `[0, 1]`, 0.5 when centered. Noise can push it
/// outside that range; the value is never clamped, so far-out-of-range
/// readings stay visible to the classifier.
pub fn iris_horizontal_ratio(landmarks: &[Landmark], eye: &EyeIndices) -> Option<f64> {
    let width = eye_width(landmarks, eye)?;
    let from_inner = distance(&landmarks[eye.inner_corner], &landmarks[eye.iris_center]);
    Some(from_inner / width)
}

/// Measures both ratios for one eye, or `None` when the eye is degenerate.
pub fn measure(landmarks: &[Landmark], eye: &EyeIndices) -> Option<EyeMetrics> {
    Some(EyeMetrics {
        openness_ratio: eye_aspect_ratio(landmarks, eye)?,
        iris_horizontal_ratio: iris_horizontal_ratio(landmarks, eye)?,
    })
}

fn eye_width(landmarks: &[Landmark], eye: &EyeIndices) -> Option<f64> {
    let width = distance(&landmarks[eye.outer_corner], &landmarks[eye.inner_corner]);
    if width < MIN_EYE_WIDTH {
        return None;
    }
    Some(width)
}
