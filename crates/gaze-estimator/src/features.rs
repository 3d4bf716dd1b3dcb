//! Per-eye geometric feature extraction.

use gaze_core::{centroid, distance, FrameObservation, HeadPose, Pt2, Real, Vec2};

/// Minimum boundary points for a usable eye contour.
///
/// The 6-point layout follows the usual eye-contour convention: points 0
/// and 3 are the horizontal corners, point 1 sits on the upper lid and
/// point 5 on the lower lid.
pub const MIN_CONTOUR_POINTS: usize = 6;

/// Geometric features for a single eye, derived once per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct EyeFeatures {
    /// Centroid of the boundary polygon.
    pub center: Pt2,
    /// Pupil position relative to the eye center (signed, landmark space).
    pub pupil_offset: Vec2,
    /// Vertical over horizontal eye-opening ratio; 1.0 means "fully open,
    /// no information".
    pub aspect_ratio: Real,
    /// The boundary points the features were derived from.
    pub landmarks: Vec<Pt2>,
}

/// Frame-level aggregate input to the gaze model.
#[derive(Debug, Clone, PartialEq)]
pub struct GazeFeatures {
    pub left: EyeFeatures,
    pub right: EyeFeatures,
    pub head_pose: HeadPose,
    /// Distance between the two eye centers (landmark space).
    pub eye_distance: Real,
}

/// Compute [`EyeFeatures`] from an ordered eye boundary polygon and a pupil
/// estimate.
///
/// Degenerate inputs (fewer than [`MIN_CONTOUR_POINTS`] points, or a
/// zero-width eye box) yield a neutral feature set instead of an error:
/// the center collapses onto the pupil, the offset is zero and the aspect
/// ratio reads 1.0. The caller always gets *a* feature set for every
/// detector frame.
pub fn extract_eye_features(landmarks: &[Pt2], pupil: Pt2) -> EyeFeatures {
    if landmarks.len() < MIN_CONTOUR_POINTS {
        return degenerate_features(landmarks, pupil);
    }
    let Some(center) = centroid(landmarks) else {
        return degenerate_features(landmarks, pupil);
    };

    let vertical = (landmarks[1].y - landmarks[5].y).abs();
    let horizontal = (landmarks[3].x - landmarks[0].x).abs();
    let aspect_ratio = if horizontal > 0.0 {
        vertical / horizontal
    } else {
        1.0
    };

    EyeFeatures {
        center,
        pupil_offset: pupil - center,
        aspect_ratio,
        landmarks: landmarks.to_vec(),
    }
}

fn degenerate_features(landmarks: &[Pt2], pupil: Pt2) -> EyeFeatures {
    EyeFeatures {
        center: pupil,
        pupil_offset: Vec2::zeros(),
        aspect_ratio: 1.0,
        landmarks: landmarks.to_vec(),
    }
}

/// Aggregate both eyes and the head pose into the model input for one frame.
pub fn extract_gaze_features(obs: &FrameObservation) -> GazeFeatures {
    let left = extract_eye_features(&obs.left_eye, obs.pupil_left);
    let right = extract_eye_features(&obs.right_eye, obs.pupil_right);
    let eye_distance = distance(&left.center, &right.center);

    GazeFeatures {
        left,
        right,
        head_pose: obs.head_pose,
        eye_distance,
    }
}
