//! Deterministic synthetic gaze data for tests and benchmarks.

mod noise;
mod scatter;

pub use noise::UniformPointNoise;
pub use scatter::{grid_targets, scatter_around};
