//! Dense linear system solving for least-squares fits.
//!
//! The solvers in this workspace reduce their estimation problems to small
//! square systems (normal equations), solved here by Gaussian elimination
//! with partial pivoting. A pivot whose magnitude falls below the tolerance
//! marks the system as singular — typically caused by degenerate (collinear)
//! input geometry.

use crate::Real;
use nalgebra::{DMatrix, DVector};
use thiserror::Error;

/// Pivot magnitude below which a system is treated as singular.
pub const DEFAULT_PIVOT_TOLERANCE: Real = 1e-10;

#[derive(Debug, Clone, Error)]
pub enum SolveError {
    #[error("system dimensions mismatch: matrix is {rows}x{cols}, rhs has {rhs} entries")]
    DimensionMismatch {
        rows: usize,
        cols: usize,
        rhs: usize,
    },
    #[error("pivot magnitude {pivot:e} below tolerance {tolerance:e} in column {column}")]
    Singular {
        column: usize,
        pivot: Real,
        tolerance: Real,
    },
}

/// Solve the square system `A x = b` by Gaussian elimination with partial
/// pivoting.
///
/// Consumes `a` and `b` as elimination scratch space. Fails with
/// [`SolveError::Singular`] if any pivot's magnitude drops below
/// `tolerance`.
pub fn solve_dense(
    mut a: DMatrix<Real>,
    mut b: DVector<Real>,
    tolerance: Real,
) -> Result<DVector<Real>, SolveError> {
    let n = a.nrows();
    if a.ncols() != n || b.len() != n {
        return Err(SolveError::DimensionMismatch {
            rows: a.nrows(),
            cols: a.ncols(),
            rhs: b.len(),
        });
    }

    // Forward elimination.
    for col in 0..n {
        let mut pivot_row = col;
        let mut pivot_mag = a[(col, col)].abs();
        for row in (col + 1)..n {
            let mag = a[(row, col)].abs();
            if mag > pivot_mag {
                pivot_row = row;
                pivot_mag = mag;
            }
        }

        if pivot_mag < tolerance {
            return Err(SolveError::Singular {
                column: col,
                pivot: pivot_mag,
                tolerance,
            });
        }

        if pivot_row != col {
            a.swap_rows(pivot_row, col);
            b.swap_rows(pivot_row, col);
        }

        let pivot = a[(col, col)];
        for row in (col + 1)..n {
            let factor = a[(row, col)] / pivot;
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[(row, k)] -= factor * a[(col, k)];
            }
            b[row] -= factor * b[col];
        }
    }

    // Back substitution.
    let mut x = DVector::<Real>::zeros(n);
    for col in (0..n).rev() {
        let mut sum = b[col];
        for k in (col + 1)..n {
            sum -= a[(col, k)] * x[k];
        }
        x[col] = sum / a[(col, col)];
    }

    Ok(x)
}
