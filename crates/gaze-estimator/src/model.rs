//! Parametric screen-gaze mapping with head-pose compensation.

use crate::GazeFeatures;
use gaze_core::{clamp_unit, ProcessingMode, Pt2, Real};
use log::debug;
use serde::{Deserialize, Serialize};

/// Tunable parameters of the gaze mapping.
///
/// The mapping is a geometric heuristic, not a trained regressor; both
/// gains are expected to be tuned per deployment rather than treated as
/// fixed constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GazeModelConfig {
    /// Gain applied to the mean pupil offset before centering. Matched to
    /// the offset's expected dynamic range in landmark space.
    pub offset_scale: Real,
    /// Degrees of head rotation per unit of normalized gaze shift used for
    /// head-pose compensation.
    pub pose_divisor: Real,
    /// Processing mode consumed by downstream smoothing.
    pub mode: ProcessingMode,
}

impl Default for GazeModelConfig {
    fn default() -> Self {
        Self {
            offset_scale: 2.0,
            pose_divisor: 60.0,
            mode: ProcessingMode::default(),
        }
    }
}

/// Maps per-frame [`GazeFeatures`] to a normalized `[0, 1] × [0, 1]`
/// screen-relative point.
#[derive(Debug, Clone)]
pub struct GazeModel {
    config: GazeModelConfig,
}

impl GazeModel {
    pub fn new(config: GazeModelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GazeModelConfig {
        &self.config
    }

    pub fn mode(&self) -> ProcessingMode {
        self.config.mode
    }

    /// Estimate the normalized gaze point for one frame.
    ///
    /// Averages the two eyes' pupil offsets, scales and centers them, then
    /// compensates for head yaw/pitch and clamps to the unit square.
    /// Returns `None` when the computation is not finite (the caller drops
    /// the frame).
    pub fn estimate(&self, features: &GazeFeatures) -> Option<Pt2> {
        let offset = (features.left.pupil_offset + features.right.pupil_offset) * 0.5;

        let raw_x = 0.5 + offset.x * self.config.offset_scale;
        let raw_y = 0.5 + offset.y * self.config.offset_scale;

        let x = raw_x - features.head_pose.yaw_deg / self.config.pose_divisor;
        let y = raw_y - features.head_pose.pitch_deg / self.config.pose_divisor;

        if !x.is_finite() || !y.is_finite() {
            debug!("non-finite gaze estimate ({x}, {y}), dropping frame");
            return None;
        }

        Some(Pt2::new(clamp_unit(x), clamp_unit(y)))
    }
}

impl Default for GazeModel {
    fn default() -> Self {
        Self::new(GazeModelConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EyeFeatures;
    use gaze_core::{HeadPose, Vec2};

    fn neutral_pose() -> HeadPose {
        HeadPose {
            pitch_deg: 0.0,
            yaw_deg: 0.0,
            roll_deg: 0.0,
            confidence: 1.0,
            timestamp_ms: 0,
        }
    }

    fn features_with(offset: Vec2, pose: HeadPose) -> GazeFeatures {
        let eye = |center: Pt2| EyeFeatures {
            center,
            pupil_offset: offset,
            aspect_ratio: 0.3,
            landmarks: Vec::new(),
        };
        GazeFeatures {
            left: eye(Pt2::new(0.3, 0.4)),
            right: eye(Pt2::new(0.7, 0.4)),
            head_pose: pose,
            eye_distance: 0.4,
        }
    }

    #[test]
    fn centered_offset_maps_to_screen_center() {
        let model = GazeModel::default();
        let p = model
            .estimate(&features_with(Vec2::zeros(), neutral_pose()))
            .unwrap();
        assert!((p.x - 0.5).abs() < 1e-12);
        assert!((p.y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn offset_is_scaled_and_centered() {
        let model = GazeModel::default();
        let p = model
            .estimate(&features_with(Vec2::new(0.1, -0.05), neutral_pose()))
            .unwrap();
        assert!((p.x - 0.7).abs() < 1e-12);
        assert!((p.y - 0.4).abs() < 1e-12);
    }

    #[test]
    fn yaw_shifts_x_pitch_shifts_y() {
        let model = GazeModel::default();
        let pose = HeadPose {
            pitch_deg: -6.0,
            yaw_deg: 12.0,
            ..neutral_pose()
        };
        let p = model.estimate(&features_with(Vec2::zeros(), pose)).unwrap();
        assert!((p.x - (0.5 - 12.0 / 60.0)).abs() < 1e-12);
        assert!((p.y - (0.5 + 6.0 / 60.0)).abs() < 1e-12);
    }

    #[test]
    fn estimate_is_clamped_to_unit_square() {
        let model = GazeModel::default();
        let p = model
            .estimate(&features_with(Vec2::new(5.0, -5.0), neutral_pose()))
            .unwrap();
        assert_eq!(p.x, 1.0);
        assert_eq!(p.y, 0.0);
    }

    #[test]
    fn non_finite_input_yields_none() {
        let model = GazeModel::default();
        let pose = HeadPose {
            yaw_deg: Real::NAN,
            ..neutral_pose()
        };
        assert!(model.estimate(&features_with(Vec2::zeros(), pose)).is_none());
    }

    #[test]
    fn config_json_roundtrip() {
        let config = GazeModelConfig {
            offset_scale: 1.8,
            pose_divisor: 45.0,
            mode: ProcessingMode::High,
        };
        let json = serde_json::to_string(&config).unwrap();
        let restored: GazeModelConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, config);
    }
}
