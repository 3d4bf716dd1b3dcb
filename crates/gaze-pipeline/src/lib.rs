//! The per-frame gaze runtime.
//!
//! Orchestrates one processing flow per camera frame: feature extraction,
//! gaze estimation, calibration correction, viewport mapping, temporal
//! smoothing, confidence scoring, and ordered emission to consumers across
//! the processing/consumer boundary.
//!
//! Two confidence strategies are provided, selected by which upstream
//! signals are available:
//!
//! - `confidence`: multiplicative head-pose / eye-quality scoring for
//!   landmark-backed frames,
//! - `attention`: an asymmetric two-rate EMA over sample freshness and
//!   viewport bounds for continuous sources without per-frame eye features.

mod attention;
mod confidence;
mod smoothing;
mod stream;
mod tracker;

pub use attention::*;
pub use confidence::*;
pub use smoothing::*;
pub use stream::*;
pub use tracker::*;
