//! Core math and data-model primitives for the gaze engine.
//!
//! This crate provides the foundational building blocks used by all other
//! crates in the workspace:
//!
//! - linear algebra type aliases (`Real`, `Pt2`, `Vec2`, and friends),
//! - a dense linear solver (Gaussian elimination with partial pivoting),
//! - 2-D affine transforms and their least-squares estimation,
//! - the shared data model (`HeadPose`, `GazeData`, `FrameObservation`, ...),
//! - deterministic synthetic-data helpers for tests and benchmarks.
//!
//! # Modules
//!
//! - `math`: type aliases and geometric helpers.
//! - `linear`: dense system solving.
//! - `affine`: affine transforms and fitting.
//! - [`synthetic`]: deterministic synthetic data (tests/examples/benchmarks).
//!
//! # Example
//!
//! ```
//! use gaze_core::{fit_affine, Pt2};
//!
//! let src = vec![Pt2::new(0.0, 0.0), Pt2::new(1.0, 0.0), Pt2::new(0.0, 1.0)];
//! let dst = vec![Pt2::new(1.0, 1.0), Pt2::new(3.0, 1.0), Pt2::new(1.0, 3.0)];
//!
//! let t = fit_affine(&src, &dst).unwrap();
//! let p = t.apply(&Pt2::new(0.5, 0.5));
//! assert!((p.x - 2.0).abs() < 1e-9 && (p.y - 2.0).abs() < 1e-9);
//! ```

mod affine;
mod linear;
mod math;
/// Deterministic synthetic data generation helpers.
///
/// This module provides small, reusable building blocks for constructing
/// synthetic gaze datasets (target grids, clustered scatter, noise). It is
/// used in workspace tests and can be useful for benchmarking and
/// regression testing.
pub mod synthetic;
mod types;

pub use affine::*;
pub use linear::*;
pub use math::*;
pub use types::*;
