//! 2-D affine transforms and their least-squares estimation.

use crate::{
    from_homogeneous, solve_dense, to_homogeneous, Mat3, Pt2, Real, SolveError,
    DEFAULT_PIVOT_TOLERANCE,
};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum FitError {
    #[error("need at least 3 point correspondences, got {0}")]
    NotEnoughPoints(usize),
    #[error("source and target point counts differ ({src} vs {dst})")]
    MismatchedLengths { src: usize, dst: usize },
    #[error("degenerate correspondence geometry: {0}")]
    Degenerate(#[from] SolveError),
}

/// A planar affine map `p' = M p` with `M` a 3×3 homogeneous matrix whose
/// last row is `[0, 0, 1]` (6 free parameters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    matrix: Mat3,
}

impl AffineTransform {
    /// The identity map.
    pub fn identity() -> Self {
        Self {
            matrix: Mat3::identity(),
        }
    }

    /// Build from the six row-major coefficients
    /// `[a, b, tx, c, d, ty]` of the top two rows.
    pub fn from_coefficients(coeffs: [Real; 6]) -> Self {
        let [a, b, tx, c, d, ty] = coeffs;
        Self {
            matrix: Mat3::new(a, b, tx, c, d, ty, 0.0, 0.0, 1.0),
        }
    }

    /// The underlying homogeneous matrix.
    pub fn matrix(&self) -> &Mat3 {
        &self.matrix
    }

    /// Apply the transform to a point (homogeneous multiply).
    pub fn apply(&self, p: &Pt2) -> Pt2 {
        from_homogeneous(&(self.matrix * to_homogeneous(p)))
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Fit an affine transform mapping `src` points onto `dst` points by least
/// squares, with the default pivot tolerance.
pub fn fit_affine(src: &[Pt2], dst: &[Pt2]) -> Result<AffineTransform, FitError> {
    fit_affine_with_tolerance(src, dst, DEFAULT_PIVOT_TOLERANCE)
}

/// Fit an affine transform mapping `src` points onto `dst` points by least
/// squares.
///
/// Stacks one row pair per correspondence,
/// `[x, y, 1, 0, 0, 0]` and `[0, 0, 0, x, y, 1]`, into the design matrix
/// `A`, then solves the normal equations `AᵗA x = Aᵗb` by Gaussian
/// elimination. Three non-collinear correspondences determine the six
/// parameters exactly; more are fit in the least-squares sense.
///
/// Fails with [`FitError::Degenerate`] when the correspondences are
/// collinear or otherwise rank-deficient.
pub fn fit_affine_with_tolerance(
    src: &[Pt2],
    dst: &[Pt2],
    tolerance: Real,
) -> Result<AffineTransform, FitError> {
    let n = src.len();
    if dst.len() != n {
        return Err(FitError::MismatchedLengths {
            src: n,
            dst: dst.len(),
        });
    }
    if n < 3 {
        return Err(FitError::NotEnoughPoints(n));
    }

    let mut a = DMatrix::<Real>::zeros(2 * n, 6);
    let mut b = DVector::<Real>::zeros(2 * n);

    for (i, (s, d)) in src.iter().zip(dst.iter()).enumerate() {
        let r0 = 2 * i;
        let r1 = 2 * i + 1;

        a[(r0, 0)] = s.x;
        a[(r0, 1)] = s.y;
        a[(r0, 2)] = 1.0;
        b[r0] = d.x;

        a[(r1, 3)] = s.x;
        a[(r1, 4)] = s.y;
        a[(r1, 5)] = 1.0;
        b[r1] = d.y;
    }

    let ata = a.transpose() * &a;
    let atb = a.transpose() * &b;

    let params = solve_dense(ata, atb, tolerance)?;
    Ok(AffineTransform::from_coefficients([
        params[0], params[1], params[2], params[3], params[4], params[5],
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance;

    #[test]
    fn identity_applies_unchanged() {
        let t = AffineTransform::identity();
        let p = Pt2::new(12.5, -3.0);
        assert!(distance(&t.apply(&p), &p) < 1e-15);
    }

    #[test]
    fn exact_correspondences_recover_identity() {
        let pts = vec![
            Pt2::new(0.0, 0.0),
            Pt2::new(100.0, 0.0),
            Pt2::new(0.0, 100.0),
            Pt2::new(100.0, 100.0),
        ];

        let t = fit_affine(&pts, &pts).unwrap();
        let m = t.matrix();
        for r in 0..3 {
            for c in 0..3 {
                let expected = if r == c { 1.0 } else { 0.0 };
                assert!(
                    (m[(r, c)] - expected).abs() < 1e-9,
                    "entry ({}, {}) = {}",
                    r,
                    c,
                    m[(r, c)]
                );
            }
        }
    }

    #[test]
    fn recovers_scale_and_translation() {
        let src = vec![
            Pt2::new(0.0, 0.0),
            Pt2::new(1.0, 0.0),
            Pt2::new(0.0, 1.0),
            Pt2::new(1.0, 1.0),
        ];
        let dst: Vec<Pt2> = src
            .iter()
            .map(|p| Pt2::new(2.0 * p.x + 10.0, 3.0 * p.y - 5.0))
            .collect();

        let t = fit_affine(&src, &dst).unwrap();
        for (s, d) in src.iter().zip(dst.iter()) {
            assert!(distance(&t.apply(s), d) < 1e-9);
        }
    }

    #[test]
    fn collinear_points_are_degenerate() {
        let src = vec![
            Pt2::new(0.0, 0.0),
            Pt2::new(1.0, 1.0),
            Pt2::new(2.0, 2.0),
        ];
        let dst = src.clone();

        let err = fit_affine(&src, &dst).unwrap_err();
        assert!(matches!(err, FitError::Degenerate(_)));
    }

    #[test]
    fn too_few_points_are_rejected() {
        let src = vec![Pt2::new(0.0, 0.0), Pt2::new(1.0, 0.0)];
        let dst = src.clone();
        assert!(matches!(
            fit_affine(&src, &dst),
            Err(FitError::NotEnoughPoints(2))
        ));
    }

    #[test]
    fn json_roundtrip() {
        let t = AffineTransform::from_coefficients([1.1, 0.0, 4.0, 0.0, 0.9, -2.0]);
        let json = serde_json::to_string(&t).unwrap();
        let restored: AffineTransform = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, t);
    }
}
