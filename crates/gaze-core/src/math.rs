//! Mathematical type aliases and geometric helpers.
//!
//! This module provides the fundamental types used throughout the workspace
//! and small utility functions for homogeneous coordinates and point sets.

use nalgebra::{Matrix3, Point2, Vector2, Vector3};

/// Scalar type used throughout the workspace (currently `f64`).
pub type Real = f64;

/// 2D vector with [`Real`] components.
pub type Vec2 = Vector2<Real>;
/// 3D vector with [`Real`] components.
pub type Vec3 = Vector3<Real>;
/// 2D point with [`Real`] coordinates.
pub type Pt2 = Point2<Real>;
/// 3×3 matrix with [`Real`] entries.
pub type Mat3 = Matrix3<Real>;

/// Convert a 2D point in Euclidean coordinates into homogeneous coordinates.
///
/// Given a point `p = (x, y)`, returns the homogeneous vector `(x, y, 1)`.
pub fn to_homogeneous(p: &Pt2) -> Vec3 {
    Vec3::new(p.x, p.y, 1.0)
}

/// Convert a 3D homogeneous vector back to a 2D point.
///
/// The input is interpreted as `(x, y, w)` and the result is `(x / w, y / w)`.
/// The caller is responsible for ensuring that `w != 0`.
pub fn from_homogeneous(v: &Vec3) -> Pt2 {
    Pt2::new(v.x / v.z, v.y / v.z)
}

/// Euclidean distance between two points.
pub fn distance(a: &Pt2, b: &Pt2) -> Real {
    (a - b).norm()
}

/// Arithmetic mean of a point set.
///
/// Returns `None` for an empty slice.
pub fn centroid(points: &[Pt2]) -> Option<Pt2> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as Real;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for p in points {
        cx += p.x;
        cy += p.y;
    }
    Some(Pt2::new(cx / n, cy / n))
}

/// Clamp a scalar to the unit interval `[0, 1]`.
#[inline]
pub fn clamp_unit(v: Real) -> Real {
    v.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn homogeneous_roundtrip() {
        let p = Pt2::new(3.0, -2.0);
        let h = to_homogeneous(&p);
        assert_eq!(h, Vec3::new(3.0, -2.0, 1.0));
        let back = from_homogeneous(&h);
        assert!((back - p).norm() < 1e-15);
    }

    #[test]
    fn from_homogeneous_divides_by_w() {
        let p = from_homogeneous(&Vec3::new(4.0, 6.0, 2.0));
        assert_eq!(p, Pt2::new(2.0, 3.0));
    }

    #[test]
    fn centroid_of_square() {
        let points = vec![
            Pt2::new(0.0, 0.0),
            Pt2::new(2.0, 0.0),
            Pt2::new(2.0, 2.0),
            Pt2::new(0.0, 2.0),
        ];
        let c = centroid(&points).unwrap();
        assert!((c - Pt2::new(1.0, 1.0)).norm() < 1e-12);
    }

    #[test]
    fn centroid_empty_is_none() {
        assert!(centroid(&[]).is_none());
    }

    #[test]
    fn clamp_unit_bounds() {
        assert_eq!(clamp_unit(-0.5), 0.0);
        assert_eq!(clamp_unit(0.25), 0.25);
        assert_eq!(clamp_unit(1.5), 1.0);
    }
}
