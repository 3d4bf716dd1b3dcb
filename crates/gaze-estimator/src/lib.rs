//! Feature extraction and gaze estimation.
//!
//! Turns the raw eye landmark polygons and pupil estimates produced by an
//! external face/landmark detector into a compact per-frame feature set,
//! then maps that feature set to a normalized `[0, 1] × [0, 1]`
//! screen-relative gaze point with head-pose compensation.

mod features;
mod model;

pub use features::*;
pub use model::*;
