//! Per-frame orchestration of the full gaze runtime.

use crate::{
    frame_confidence, GazeStream, PoseConfidenceConfig, RecencyWeightedSmoother,
    DEFAULT_STREAM_CAPACITY,
};
use crossbeam_channel::Receiver;
use gaze_calibration::{
    CalibrationPoint, CalibrationReport, CalibrationSession, SessionError, SessionOptions,
};
use gaze_core::{AffineTransform, FrameObservation, GazeData, Pt2, Real, Viewport};
use gaze_estimator::{extract_gaze_features, GazeModel, GazeModelConfig};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// Aggregate configuration of the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub model: GazeModelConfig,
    pub session: SessionOptions,
    pub pose_confidence: PoseConfidenceConfig,
    pub viewport: Viewport,
    pub stream_capacity: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            model: GazeModelConfig::default(),
            session: SessionOptions::default(),
            pose_confidence: PoseConfidenceConfig::default(),
            viewport: Viewport::default(),
            stream_capacity: DEFAULT_STREAM_CAPACITY,
        }
    }
}

/// Shared slot holding the active calibration correction.
///
/// The tracker swaps it on finish/clear; any holder of a clone (e.g. a UI
/// thread) observes the change on the very next frame.
#[derive(Debug, Clone, Default)]
pub struct TransformSlot {
    inner: Arc<RwLock<Option<AffineTransform>>>,
}

impl TransformSlot {
    pub fn get(&self) -> Option<AffineTransform> {
        *self
            .inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set(&self, transform: Option<AffineTransform>) {
        *self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = transform;
    }
}

/// The per-frame gaze runtime.
///
/// Frames are processed strictly one at a time in arrival order; the
/// tracker performs no I/O and never blocks. Results cross to consumers
/// through the bounded sample stream handed out at construction.
#[derive(Debug)]
pub struct GazeTracker {
    model: GazeModel,
    session: CalibrationSession,
    transform: TransformSlot,
    smoother: RecencyWeightedSmoother,
    pose_confidence: PoseConfidenceConfig,
    viewport: Viewport,
    stream: GazeStream,
    dropped_frames: u64,
}

impl GazeTracker {
    /// Build a tracker and the receiving end of its sample stream.
    pub fn new(config: TrackerConfig) -> (Self, Receiver<GazeData>) {
        let stream = GazeStream::with_capacity(config.stream_capacity);
        let receiver = stream.subscribe();
        let tracker = Self {
            model: GazeModel::new(config.model),
            session: CalibrationSession::new(config.session),
            transform: TransformSlot::default(),
            smoother: RecencyWeightedSmoother::new(config.model.mode.smoothing_window()),
            pose_confidence: config.pose_confidence,
            viewport: config.viewport,
            stream,
            dropped_frames: 0,
        };
        (tracker, receiver)
    }

    /// Process one detector frame.
    ///
    /// Returns the emitted sample, or `None` when the frame was dropped
    /// (no usable estimate, or a non-finite result at the boundary).
    pub fn process_frame(&mut self, obs: &FrameObservation) -> Option<GazeData> {
        let now_ms = obs.head_pose.timestamp_ms;
        self.session.poll(now_ms);

        let features = extract_gaze_features(obs);
        let Some(normalized) = self.model.estimate(&features) else {
            self.dropped_frames += 1;
            return None;
        };

        let pixel = Pt2::new(
            normalized.x * self.viewport.width,
            normalized.y * self.viewport.height,
        );
        let confidence = frame_confidence(&features, &self.pose_confidence);

        // A collecting session sees the uncorrected estimate: the fit maps
        // raw gaze onto targets, never a previous correction's output.
        if self.session.is_collecting() {
            self.session.add_gaze_sample(&GazeData {
                x: pixel.x,
                y: pixel.y,
                confidence,
                timestamp_ms: now_ms,
            });
        }

        let corrected = match self.transform.get() {
            Some(t) => t.apply(&pixel),
            None => pixel,
        };
        let smoothed = self.smoother.filter(corrected);

        if !smoothed.x.is_finite() || !smoothed.y.is_finite() {
            self.dropped_frames += 1;
            return None;
        }

        let sample = GazeData {
            x: smoothed.x,
            y: smoothed.y,
            confidence,
            timestamp_ms: now_ms,
        };
        self.stream.emit(sample);
        Some(sample)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Calibration facade
    // ─────────────────────────────────────────────────────────────────────

    pub fn start_calibration(&mut self, points: &[CalibrationPoint]) -> Result<(), SessionError> {
        self.session.start_calibration(points)
    }

    pub fn add_calibration_point(&mut self, order: u32, now_ms: u64) -> Result<(), SessionError> {
        self.session.add_calibration_point(order, now_ms)
    }

    /// Finish the active session and install its correction.
    ///
    /// On failure the previously installed correction (if any) stays
    /// active.
    pub fn finish_calibration(&mut self, now_ms: u64) -> Result<CalibrationReport, SessionError> {
        let report = self.session.finish_calibration(now_ms)?;
        self.transform.set(Some(report.transform));
        self.smoother.reset();
        info!("calibration correction installed, accuracy {:.2}", report.accuracy);
        Ok(report)
    }

    /// Abort any session and drop the installed correction. The next
    /// processed frame runs uncorrected.
    pub fn clear_calibration(&mut self) {
        self.session.clear_calibration();
        self.transform.set(None);
        self.smoother.reset();
        debug!("calibration cleared");
    }

    pub fn accuracy(&self) -> Real {
        self.session.accuracy()
    }

    pub fn progress(&self) -> Real {
        self.session.progress()
    }

    pub fn is_calibrating(&self) -> bool {
        self.session.is_collecting()
    }

    /// Finalize overdue collection windows from wall-clock time, without
    /// frame traffic.
    pub fn poll_calibration(&mut self, now_ms: u64) {
        self.session.poll(now_ms);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    /// A clonable handle onto the active correction.
    pub fn transform_slot(&self) -> TransformSlot {
        self.transform.clone()
    }

    /// A new receiving handle onto the sample stream.
    pub fn subscribe(&self) -> Receiver<GazeData> {
        self.stream.subscribe()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Frames rejected at the estimation boundary.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }

    /// Samples lost to a full consumer channel.
    pub fn dropped_emissions(&self) -> u64 {
        self.stream.dropped_samples()
    }
}
