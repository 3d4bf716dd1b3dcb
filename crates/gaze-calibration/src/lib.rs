//! Calibration session management.
//!
//! A calibration session presents an ordered sequence of on-screen targets,
//! accumulates gaze samples per target inside a timed window, filters
//! outliers, and fits a 2-D affine correction mapping measured gaze onto the
//! true target positions. The fitted transform and its residual accuracy are
//! exposed for the runtime pipeline to apply.
//!
//! # Example
//!
//! ```no_run
//! use gaze_calibration::{CalibrationPoint, CalibrationSession};
//!
//! let mut session = CalibrationSession::default();
//! session.start_calibration(&[
//!     CalibrationPoint { x: 200.0, y: 200.0, order: 0 },
//!     CalibrationPoint { x: 1700.0, y: 200.0, order: 1 },
//!     CalibrationPoint { x: 960.0, y: 900.0, order: 2 },
//! ])?;
//!
//! // Per target: open its window, then feed per-frame samples.
//! session.add_calibration_point(0, 0)?;
//! // ... session.add_gaze_sample(&sample) per frame ...
//!
//! let report = session.finish_calibration(10_000)?;
//! println!("accuracy {:.2}", report.accuracy);
//! # Ok::<(), gaze_calibration::SessionError>(())
//! ```

mod fit;
mod session;

pub use fit::*;
pub use session::*;
