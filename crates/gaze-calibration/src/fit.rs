//! Affine fit scoring and session reports.

use crate::CalibrationSample;
use gaze_core::{
    centroid, distance, fit_affine_with_tolerance, AffineTransform, FitError, Pt2, Real,
};
use serde::{Deserialize, Serialize};

/// Residual error statistics after applying a fitted transform to the
/// per-point sample centroids.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResidualStats {
    /// Mean Euclidean residual (px).
    pub mean: Real,
    /// Root-mean-square residual (px).
    pub rms: Real,
    /// Largest single residual (px).
    pub max: Real,
    /// Number of points that contributed.
    pub count: usize,
}

/// Outcome of a finished calibration session.
///
/// Shared read-only by the runtime until cleared or replaced by a new
/// completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReport {
    /// Fitted correction mapping measured gaze (px) onto targets (px).
    pub transform: AffineTransform,
    /// `1.0` at zero residual, falling linearly to `0.0` at the maximum
    /// error cutoff.
    pub accuracy: Real,
    /// Residual statistics over the committed points.
    pub residuals: ResidualStats,
    /// Points that survived filtering and entered the fit.
    pub committed_points: usize,
    /// Points dropped for lack of usable samples.
    pub dropped_points: usize,
}

/// Reduce committed samples to centroids and fit the affine correction.
///
/// Returns the transform together with its residual statistics against the
/// same samples.
pub fn fit_samples(
    samples: &[CalibrationSample],
    pivot_tolerance: Real,
) -> Result<(AffineTransform, ResidualStats), FitError> {
    let mut sources = Vec::with_capacity(samples.len());
    let mut targets = Vec::with_capacity(samples.len());
    for sample in samples {
        let Some(c) = centroid(&sample.gaze_points) else {
            continue;
        };
        sources.push(c);
        targets.push(sample.target);
    }

    let transform = fit_affine_with_tolerance(&sources, &targets, pivot_tolerance)?;
    let residuals = residual_stats(&transform, &sources, &targets);
    Ok((transform, residuals))
}

fn residual_stats(transform: &AffineTransform, sources: &[Pt2], targets: &[Pt2]) -> ResidualStats {
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    let mut max = 0.0_f64;
    for (s, t) in sources.iter().zip(targets.iter()) {
        let err = distance(&transform.apply(s), t);
        sum += err;
        sum_sq += err * err;
        max = max.max(err);
    }

    let count = sources.len();
    if count == 0 {
        return ResidualStats {
            mean: 0.0,
            rms: 0.0,
            max: 0.0,
            count: 0,
        };
    }
    let n = count as Real;
    ResidualStats {
        mean: sum / n,
        rms: (sum_sq / n).sqrt(),
        max,
        count,
    }
}

/// Accuracy score from the mean residual: `1.0` at zero error, `0.0` at or
/// beyond `max_error_px`.
pub fn accuracy_score(mean_residual: Real, max_error_px: Real) -> Real {
    if max_error_px <= 0.0 {
        return 0.0;
    }
    (1.0 - mean_residual / max_error_px).clamp(0.0, 1.0)
}
