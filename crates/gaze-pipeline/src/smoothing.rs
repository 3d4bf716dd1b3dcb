//! Temporal smoothing of pixel-space gaze points.

use gaze_core::{Pt2, Real};
use std::collections::VecDeque;

/// Recency-weighted moving average over a fixed-length history.
///
/// Weights grow linearly with recency: the oldest frame counts 1, the
/// newest counts `window`. A window of zero turns the filter into a
/// pass-through.
#[derive(Debug, Clone)]
pub struct RecencyWeightedSmoother {
    window: usize,
    history: VecDeque<Pt2>,
}

impl RecencyWeightedSmoother {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            history: VecDeque::with_capacity(window),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Push a point and return the weighted average over the history.
    pub fn filter(&mut self, p: Pt2) -> Pt2 {
        if self.window == 0 {
            return p;
        }

        self.history.push_back(p);
        while self.history.len() > self.window {
            self.history.pop_front();
        }

        let mut sx = 0.0;
        let mut sy = 0.0;
        let mut weight_sum = 0.0;
        for (i, q) in self.history.iter().enumerate() {
            let w = (i + 1) as Real;
            sx += q.x * w;
            sy += q.y * w;
            weight_sum += w;
        }
        Pt2::new(sx / weight_sum, sy / weight_sum)
    }

    /// Drop the accumulated history, e.g. after a calibration swap.
    pub fn reset(&mut self) {
        self.history.clear();
    }
}
