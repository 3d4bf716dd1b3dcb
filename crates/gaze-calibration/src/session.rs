//! The calibration session state machine.

use crate::{accuracy_score, fit_samples, CalibrationReport};
use gaze_core::{distance, FitError, GazeData, Pt2, Real, DEFAULT_PIVOT_TOLERANCE};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tunable thresholds for sample collection and fitting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Settling time after a target is shown, during which incoming samples
    /// are discarded (ms).
    pub stabilization_ms: u64,
    /// Length of the sample-collection window that follows (ms).
    pub collection_ms: u64,
    /// Collection stops early once this many samples are gathered.
    pub target_sample_count: usize,
    /// Samples farther than this from the target are filtered out (px).
    pub max_deviation_px: Real,
    /// Minimum surviving samples for the point to be committed; below this
    /// the point is dropped and the session moves on.
    pub min_filtered_samples: usize,
    /// Minimum committed points required for a fit.
    pub min_committed_points: usize,
    /// Mean residual (px) at or beyond which accuracy scores zero.
    pub max_error_px: Real,
    /// Pivot tolerance for the affine solve.
    pub pivot_tolerance: Real,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            stabilization_ms: 500,
            collection_ms: 2000,
            target_sample_count: 30,
            max_deviation_px: 50.0,
            min_filtered_samples: 15,
            min_committed_points: 3,
            max_error_px: 200.0,
            pivot_tolerance: DEFAULT_PIVOT_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("a calibration session is already collecting")]
    AlreadyCollecting,
    #[error("calibration point list is empty")]
    NoPoints,
    #[error("duplicate calibration point order {0}")]
    DuplicateOrder(u32),
    #[error("no calibration session is collecting")]
    NotCollecting,
    #[error("no calibration point with order {0} in this session")]
    UnknownOrder(u32),
    #[error("need at least {need} committed calibration points, got {got}")]
    NotEnoughPoints { got: usize, need: usize },
    #[error("calibration fit failed: {0}")]
    Fit(#[from] FitError),
}

/// One on-screen calibration target, in screen pixels.
///
/// `order` must be unique within a session; targets are presented in
/// ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPoint {
    pub x: Real,
    pub y: Real,
    pub order: u32,
}

impl CalibrationPoint {
    pub fn target(&self) -> Pt2 {
        Pt2::new(self.x, self.y)
    }
}

/// The filtered samples committed for one target. Immutable after creation;
/// retained for the session's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSample {
    pub target: Pt2,
    pub gaze_points: Vec<Pt2>,
    /// When the point's collection window closed.
    pub timestamp_ms: u64,
}

/// Where a session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Collecting { point_index: usize },
}

#[derive(Debug, Clone)]
struct CollectionWindow {
    target: Pt2,
    opened_at_ms: u64,
    samples: Vec<Pt2>,
}

impl CollectionWindow {
    fn collection_start(&self, options: &SessionOptions) -> u64 {
        self.opened_at_ms + options.stabilization_ms
    }

    fn collection_end(&self, options: &SessionOptions) -> u64 {
        self.opened_at_ms + options.stabilization_ms + options.collection_ms
    }
}

/// Orchestrates calibration sessions and owns the most recent fit.
///
/// One session may be active at a time; starting another while one is
/// collecting fails. All methods take explicit millisecond timestamps so
/// that window lifetimes are measured on the caller's clock, independent of
/// frame arrival.
#[derive(Debug, Clone)]
pub struct CalibrationSession {
    options: SessionOptions,
    state: SessionState,
    points: Vec<CalibrationPoint>,
    samples: Vec<CalibrationSample>,
    window: Option<CollectionWindow>,
    dropped_points: usize,
    last_fit: Option<CalibrationReport>,
}

impl CalibrationSession {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            options,
            state: SessionState::Idle,
            points: Vec::new(),
            samples: Vec::new(),
            window: None,
            dropped_points: 0,
            last_fit: None,
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_collecting(&self) -> bool {
        matches!(self.state, SessionState::Collecting { .. })
    }

    /// The session's targets, sorted by ascending `order`.
    pub fn points(&self) -> &[CalibrationPoint] {
        &self.points
    }

    /// Samples committed so far in the active session.
    pub fn samples(&self) -> &[CalibrationSample] {
        &self.samples
    }

    /// The most recent successful fit, if any.
    pub fn last_report(&self) -> Option<&CalibrationReport> {
        self.last_fit.as_ref()
    }

    /// Accuracy of the most recent fit, or `0.0` when none exists.
    pub fn accuracy(&self) -> Real {
        self.last_fit.as_ref().map_or(0.0, |r| r.accuracy)
    }

    /// Fraction of the session's targets with committed samples.
    pub fn progress(&self) -> Real {
        if self.points.is_empty() {
            return 0.0;
        }
        self.samples.len() as Real / self.points.len() as Real
    }

    /// Begin a session over the given targets.
    ///
    /// Fails if a session is already collecting, the list is empty, or two
    /// targets share an `order`. No state is mutated on failure. Targets
    /// are stored sorted by ascending `order`.
    pub fn start_calibration(&mut self, points: &[CalibrationPoint]) -> Result<(), SessionError> {
        if self.is_collecting() {
            return Err(SessionError::AlreadyCollecting);
        }
        if points.is_empty() {
            return Err(SessionError::NoPoints);
        }

        let mut sorted = points.to_vec();
        sorted.sort_by_key(|p| p.order);
        for pair in sorted.windows(2) {
            if pair[0].order == pair[1].order {
                return Err(SessionError::DuplicateOrder(pair[0].order));
            }
        }

        info!("calibration session started with {} targets", sorted.len());
        self.points = sorted;
        self.samples.clear();
        self.window = None;
        self.dropped_points = 0;
        self.state = SessionState::Collecting { point_index: 0 };
        Ok(())
    }

    /// Open the timed collection window for the target with the given
    /// `order`.
    ///
    /// The window starts with a stabilization period (samples discarded)
    /// followed by the collection period. Opening a new target closes any
    /// window still pending.
    pub fn add_calibration_point(&mut self, order: u32, now_ms: u64) -> Result<(), SessionError> {
        if !self.is_collecting() {
            return Err(SessionError::NotCollecting);
        }
        let Some(point) = self.points.iter().find(|p| p.order == order).copied() else {
            return Err(SessionError::UnknownOrder(order));
        };

        if self.window.is_some() {
            self.close_window(now_ms);
        }

        debug!(
            "collection window opened for target order {} at ({}, {})",
            order, point.x, point.y
        );
        self.window = Some(CollectionWindow {
            target: point.target(),
            opened_at_ms: now_ms,
            samples: Vec::with_capacity(self.options.target_sample_count),
        });
        Ok(())
    }

    /// Feed one per-frame gaze sample (screen pixels).
    ///
    /// Ignored outside an active window and during stabilization. Appended
    /// during collection; the window finalizes once the target sample count
    /// is reached or the sample's timestamp passes the window end. Never
    /// blocks and never fails.
    pub fn add_gaze_sample(&mut self, gaze: &GazeData) {
        let Some(window) = self.window.as_mut() else {
            return;
        };

        let ts = gaze.timestamp_ms;
        if ts < window.collection_start(&self.options) {
            return;
        }
        if ts >= window.collection_end(&self.options) {
            let end = window.collection_end(&self.options);
            self.close_window(end);
            return;
        }

        window.samples.push(gaze.point());
        if window.samples.len() >= self.options.target_sample_count {
            self.close_window(ts);
        }
    }

    /// Finalize an overdue window from wall-clock time.
    ///
    /// Called independently of frame arrival so a stalled frame source
    /// cannot leave a window open forever.
    pub fn poll(&mut self, now_ms: u64) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        let end = window.collection_end(&self.options);
        if now_ms >= end {
            self.close_window(end);
        }
    }

    /// Finish the session: fit the affine correction over the committed
    /// samples and score its residual accuracy.
    ///
    /// Any still-open overdue window is finalized first. Fails when no
    /// session is collecting (nothing is mutated), when fewer than the
    /// minimum points were committed, or when the fit is numerically
    /// degenerate; in the latter two cases the session ends and a previous
    /// fit, if any, is left untouched.
    pub fn finish_calibration(&mut self, now_ms: u64) -> Result<CalibrationReport, SessionError> {
        if !self.is_collecting() {
            return Err(SessionError::NotCollecting);
        }
        self.poll(now_ms);

        let committed = self.samples.len();
        let need = self.options.min_committed_points;
        if committed < need {
            self.end_session();
            return Err(SessionError::NotEnoughPoints {
                got: committed,
                need,
            });
        }

        let fitted = fit_samples(&self.samples, self.options.pivot_tolerance);
        let (transform, residuals) = match fitted {
            Ok(ok) => ok,
            Err(err) => {
                self.end_session();
                return Err(err.into());
            }
        };

        let report = CalibrationReport {
            transform,
            accuracy: accuracy_score(residuals.mean, self.options.max_error_px),
            residuals,
            committed_points: committed,
            dropped_points: self.dropped_points,
        };
        info!(
            "calibration finished: {} points, mean residual {:.1} px, accuracy {:.2}",
            committed, residuals.mean, report.accuracy
        );

        self.last_fit = Some(report.clone());
        self.end_session();
        Ok(report)
    }

    /// Abort any active session and discard the stored fit. Always
    /// succeeds; calling it repeatedly is harmless.
    pub fn clear_calibration(&mut self) {
        self.end_session();
        self.last_fit = None;
    }

    fn end_session(&mut self) {
        self.state = SessionState::Idle;
        self.points.clear();
        self.samples.clear();
        self.window = None;
    }

    /// Close the active window: filter samples to those within the
    /// deviation radius of the target, commit them if enough survive, and
    /// advance to the next target either way.
    fn close_window(&mut self, closed_at_ms: u64) {
        let Some(window) = self.window.take() else {
            return;
        };

        let kept: Vec<Pt2> = window
            .samples
            .iter()
            .copied()
            .filter(|p| distance(p, &window.target) <= self.options.max_deviation_px)
            .collect();

        if kept.len() >= self.options.min_filtered_samples {
            debug!(
                "target at ({}, {}) committed with {} of {} samples",
                window.target.x,
                window.target.y,
                kept.len(),
                window.samples.len()
            );
            self.samples.push(CalibrationSample {
                target: window.target,
                gaze_points: kept,
                timestamp_ms: closed_at_ms,
            });
        } else {
            debug!(
                "target at ({}, {}) dropped: {} of {} samples survived filtering",
                window.target.x,
                window.target.y,
                kept.len(),
                window.samples.len()
            );
            self.dropped_points += 1;
        }

        if let SessionState::Collecting { point_index } = self.state {
            self.state = SessionState::Collecting {
                point_index: point_index + 1,
            };
        }
    }
}

impl Default for CalibrationSession {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}
