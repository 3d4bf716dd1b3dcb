//! Shared data model for the gaze engine.

use crate::{Pt2, Real};
use serde::{Deserialize, Serialize};

/// Head orientation estimate supplied by the external landmark detector.
///
/// Angles are in degrees; `confidence` is the detector's own quality score
/// for this pose, in `[0, 1]`. Consumed read-only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadPose {
    pub pitch_deg: Real,
    pub yaw_deg: Real,
    pub roll_deg: Real,
    pub confidence: Real,
    pub timestamp_ms: u64,
}

/// One emitted gaze sample.
///
/// Coordinates are screen pixels once the runtime has applied the viewport
/// mapping; `confidence` is always in `[0, 1]`. Samples are immutable once
/// emitted and ordered by `timestamp_ms` within a stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GazeData {
    pub x: Real,
    pub y: Real,
    pub confidence: Real,
    pub timestamp_ms: u64,
}

impl GazeData {
    /// The sample position as a point.
    pub fn point(&self) -> Pt2 {
        Pt2::new(self.x, self.y)
    }
}

/// Host viewport dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: Real,
    pub height: Real,
}

impl Viewport {
    pub fn new(width: Real, height: Real) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}

/// Per-frame observation handed over by the external face/landmark
/// detector: one ordered boundary polygon and one pupil estimate per eye,
/// plus the head pose. Landmark coordinates are in the detector's image
/// space (typically normalized `[0, 1]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameObservation {
    pub left_eye: Vec<Pt2>,
    pub right_eye: Vec<Pt2>,
    pub pupil_left: Pt2,
    pub pupil_right: Pt2,
    pub head_pose: HeadPose,
}

/// Processing mode trading smoothing latency for output stability.
///
/// The mode never changes the estimation math; downstream components use it
/// to size their temporal filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProcessingMode {
    /// No temporal smoothing; lowest latency.
    Fast,
    /// Default smoothing window.
    #[default]
    Medium,
    /// Longer smoothing window; steadiest output.
    High,
}

impl ProcessingMode {
    /// Smoothing history length used by the runtime, in frames.
    /// Zero disables smoothing.
    pub fn smoothing_window(self) -> usize {
        match self {
            ProcessingMode::Fast => 0,
            ProcessingMode::Medium => 5,
            ProcessingMode::High => 8,
        }
    }
}
