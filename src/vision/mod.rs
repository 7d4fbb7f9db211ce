//! Landmark-stream analysis: from raw face-mesh points to gaze edges.
//!
//! The external extractor delivers one [`frame::LandmarkFrame`] per camera
//! frame. The [`tracker::GazeTracker`] reduces each frame to a discrete
//! (gazing, blinking) tuple via two 2D ratio heuristics and publishes a
//! [`tracker::GazeChange`] only when the tuple moves:
//!
//! ```text
//! frame source ──► LandmarkFrame ──► GazeTracker ──► GazeChange (edges only)
//!                       │                 │
//!                       │            eye::eye_aspect_ratio  (blink)
//!                       │            eye::iris_horizontal_ratio (direction)
//!                       └── frame_slot::FrameSlot (optional thread hand-off)
//! ```
//!
//! Camera plumbing and the landmark model itself live outside this crate;
//! everything here operates on already-extracted, in-memory values.

pub mod eye;
pub mod frame;
pub mod frame_slot;
pub mod geometry;
pub mod tracker;

pub use frame::{FrameError, LandmarkFrame, LANDMARK_COUNT};
pub use frame_slot::FrameSlot;
pub use geometry::Landmark;
pub use tracker::{GazeChange, GazeConfig, GazeConfigError, GazeState, GazeTracker};
