//! Head-pose / eye-quality confidence for landmark-backed frames.

use gaze_core::{clamp_unit, Real};
use gaze_estimator::GazeFeatures;
use serde::{Deserialize, Serialize};

/// Tunable parameters of the multiplicative confidence model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseConfidenceConfig {
    /// Per-axis head rotation (degrees) past which pose quality bottoms
    /// out; the factor uses the summed absolute pitch/yaw/roll against
    /// three times this value.
    pub max_angle_deg: Real,
    /// Aspect ratio of a typical fully open eye; per-eye quality saturates
    /// at this opening.
    pub open_eye_aspect: Real,
}

impl Default for PoseConfidenceConfig {
    fn default() -> Self {
        Self {
            max_angle_deg: 30.0,
            open_eye_aspect: 0.3,
        }
    }
}

/// Score one frame's estimate quality in `[0, 1]`.
///
/// Starts at 1.0 and multiplies in three factors: deviation of the head
/// pose from frontal, mean eye-opening quality across both eyes, and the
/// detector's own pose confidence.
pub fn frame_confidence(features: &GazeFeatures, config: &PoseConfidenceConfig) -> Real {
    let pose = &features.head_pose;

    let deviation = pose.pitch_deg.abs() + pose.yaw_deg.abs() + pose.roll_deg.abs();
    let pose_factor = (1.0 - deviation / (3.0 * config.max_angle_deg)).max(0.0);

    let eye_quality = |aspect_ratio: Real| (aspect_ratio / config.open_eye_aspect).min(1.0);
    let eyes = (eye_quality(features.left.aspect_ratio) + eye_quality(features.right.aspect_ratio))
        / 2.0;

    clamp_unit(pose_factor * eyes * pose.confidence)
}
