//! Streaming confidence for continuous gaze sources.
//!
//! Sources such as browser-based trackers deliver a continuous sample
//! stream without per-frame head-pose or eye-quality features. Confidence
//! for those is a state machine over a scalar EMA, blending sample
//! freshness with viewport bounds, hard-gated by the host's focus and
//! visibility flags.

use gaze_core::{Real, Viewport};
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

/// Host focus/visibility flags, updated asynchronously from any thread.
#[derive(Debug)]
pub struct AttentionGate {
    has_focus: AtomicBool,
    is_visible: AtomicBool,
}

impl AttentionGate {
    pub fn new(has_focus: bool, is_visible: bool) -> Self {
        Self {
            has_focus: AtomicBool::new(has_focus),
            is_visible: AtomicBool::new(is_visible),
        }
    }

    pub fn set_focus(&self, has_focus: bool) {
        self.has_focus.store(has_focus, Ordering::Relaxed);
    }

    pub fn set_visible(&self, is_visible: bool) {
        self.is_visible.store(is_visible, Ordering::Relaxed);
    }

    /// Open when the consuming surface both has focus and is visible.
    pub fn is_open(&self) -> bool {
        self.has_focus.load(Ordering::Relaxed) && self.is_visible.load(Ordering::Relaxed)
    }
}

impl Default for AttentionGate {
    fn default() -> Self {
        Self::new(true, true)
    }
}

/// Tunable parameters of the streaming confidence model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamingConfidenceConfig {
    /// Inter-sample delay up to which freshness stays 1.0 (ms).
    pub fresh_full_ms: u64,
    /// Delay at which freshness reaches 0.0 (ms).
    pub fresh_zero_ms: u64,
    /// Soft margin around the viewport edges (px): full score this far
    /// inside an edge, zero this far outside.
    pub bounds_margin_px: Real,
    /// Blend weight of the freshness score.
    pub freshness_weight: Real,
    /// Blend weight of the in-bounds score.
    pub bounds_weight: Real,
    /// EMA coefficient when the target is above the current value.
    pub rise_rate: Real,
    /// EMA coefficient when the target is below the current value.
    pub fall_rate: Real,
    /// Largest decrease the EMA may take in a single update.
    pub max_drop_per_sample: Real,
    /// Value the model snaps to while the attention gate is closed.
    pub unfocused_level: Real,
    /// The stored value never exceeds this; the model does not report full
    /// certainty.
    pub ceiling: Real,
}

impl Default for StreamingConfidenceConfig {
    fn default() -> Self {
        Self {
            fresh_full_ms: 150,
            fresh_zero_ms: 600,
            bounds_margin_px: 32.0,
            freshness_weight: 0.45,
            bounds_weight: 0.55,
            rise_rate: 0.35,
            fall_rate: 0.10,
            max_drop_per_sample: 0.05,
            unfocused_level: 0.3,
            ceiling: 0.90,
        }
    }
}

/// Asymmetric two-rate EMA over freshness and in-bounds scores.
///
/// While the gate is closed the value snaps to the unfocused level and the
/// EMA state resets there — a hard override, not a blend. While open,
/// the EMA rises quickly and falls slowly, with single-update drops capped
/// so one bad sample cannot produce a confidence cliff.
#[derive(Debug, Clone)]
pub struct StreamingConfidence {
    config: StreamingConfidenceConfig,
    ema: Real,
    last_timestamp_ms: Option<u64>,
}

impl StreamingConfidence {
    pub fn new(config: StreamingConfidenceConfig) -> Self {
        Self {
            config,
            ema: config.unfocused_level,
            last_timestamp_ms: None,
        }
    }

    pub fn config(&self) -> &StreamingConfidenceConfig {
        &self.config
    }

    /// The current confidence value.
    pub fn value(&self) -> Real {
        self.ema
    }

    /// Forget all state, returning to the unfocused level.
    pub fn reset(&mut self) {
        self.ema = self.config.unfocused_level;
        self.last_timestamp_ms = None;
    }

    /// Fold one sample into the EMA and return the updated confidence.
    pub fn update(
        &mut self,
        x: Real,
        y: Real,
        timestamp_ms: u64,
        viewport: &Viewport,
        gate: &AttentionGate,
    ) -> Real {
        if !gate.is_open() {
            if self.ema != self.config.unfocused_level {
                debug!("attention gate closed, confidence snapped to floor");
            }
            self.ema = self.config.unfocused_level;
            self.last_timestamp_ms = Some(timestamp_ms);
            return self.ema;
        }

        let f_time = match self.last_timestamp_ms {
            // First sample after a reset: no delay is measurable yet.
            None => 1.0,
            Some(prev) => self.freshness(timestamp_ms.saturating_sub(prev)),
        };
        let f_bounds = (self.axis_score(x, viewport.width) + self.axis_score(y, viewport.height))
            / 2.0;

        let target = (self.config.freshness_weight * f_time
            + self.config.bounds_weight * f_bounds)
            .clamp(0.0, 1.0);

        let rate = if target > self.ema {
            self.config.rise_rate
        } else {
            self.config.fall_rate
        };
        let mut next = self.ema + rate * (target - self.ema);
        if self.ema - next > self.config.max_drop_per_sample {
            next = self.ema - self.config.max_drop_per_sample;
        }

        self.ema = next.clamp(0.0, self.config.ceiling);
        self.last_timestamp_ms = Some(timestamp_ms);
        self.ema
    }

    fn freshness(&self, dt_ms: u64) -> Real {
        let full = self.config.fresh_full_ms;
        let zero = self.config.fresh_zero_ms;
        if dt_ms <= full {
            return 1.0;
        }
        if dt_ms >= zero {
            return 0.0;
        }
        1.0 - (dt_ms - full) as Real / (zero - full) as Real
    }

    /// Soft-margin score along one axis: 1.0 at `margin` px inside either
    /// edge, falling linearly to 0.0 at `margin` px outside.
    fn axis_score(&self, v: Real, extent: Real) -> Real {
        let margin = self.config.bounds_margin_px;
        if margin <= 0.0 {
            return if (0.0..=extent).contains(&v) { 1.0 } else { 0.0 };
        }
        let edge_distance = v.min(extent - v); // negative when outside
        ((edge_distance + margin) / (2.0 * margin)).clamp(0.0, 1.0)
    }
}

impl Default for StreamingConfidence {
    fn default() -> Self {
        Self::new(StreamingConfidenceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(1000.0, 800.0)
    }

    fn centered_update(model: &mut StreamingConfidence, ts: u64, gate: &AttentionGate) -> Real {
        model.update(500.0, 400.0, ts, &viewport(), gate)
    }

    #[test]
    fn closed_gate_snaps_to_floor_immediately() {
        let gate = AttentionGate::default();
        let mut model = StreamingConfidence::default();

        // Drive the EMA up first.
        for i in 0..50 {
            centered_update(&mut model, i * 16, &gate);
        }
        assert!(model.value() > 0.8);

        gate.set_focus(false);
        let c = centered_update(&mut model, 50 * 16, &gate);
        assert_eq!(c, 0.3);
        assert_eq!(model.value(), 0.3);
    }

    #[test]
    fn never_exceeds_ceiling() {
        let gate = AttentionGate::default();
        let mut model = StreamingConfidence::default();
        for i in 0..200 {
            let c = centered_update(&mut model, i * 16, &gate);
            assert!(c <= 0.90, "confidence {}", c);
            assert!(c >= 0.0);
        }
        assert!((model.value() - 0.90).abs() < 1e-9);
    }

    #[test]
    fn single_update_drop_is_capped() {
        let gate = AttentionGate::default();
        let mut model = StreamingConfidence::default();
        for i in 0..100 {
            centered_update(&mut model, i * 16, &gate);
        }

        let mut prev = model.value();
        // Stale, far out-of-bounds samples drive the target to zero.
        for i in 0..40 {
            let ts = 100 * 16 + 5000 * (i + 1);
            let c = model.update(-500.0, -500.0, ts, &viewport(), &gate);
            assert!(c >= prev - 0.05 - 1e-12, "{} fell from {}", c, prev);
            prev = c;
        }
        assert!(model.value() < 0.1);
    }

    #[test]
    fn stale_samples_lower_the_target() {
        let gate = AttentionGate::default();
        let mut fresh = StreamingConfidence::default();
        let mut stale = StreamingConfidence::default();

        let mut ts_fresh = 0;
        let mut ts_stale = 0;
        for _ in 0..30 {
            ts_fresh += 16; // 60 Hz: freshness 1.0
            ts_stale += 700; // beyond fresh_zero_ms: freshness 0.0
            centered_update(&mut fresh, ts_fresh, &gate);
            centered_update(&mut stale, ts_stale, &gate);
        }
        assert!(fresh.value() > stale.value());
        // With bounds perfect and freshness zero, the target is 0.55.
        assert!((stale.value() - 0.55).abs() < 0.02);
    }

    #[test]
    fn out_of_viewport_samples_lower_the_target() {
        let gate = AttentionGate::default();
        let mut inside = StreamingConfidence::default();
        let mut outside = StreamingConfidence::default();

        for i in 0..30 {
            let ts = (i + 1) * 16;
            inside.update(500.0, 400.0, ts, &viewport(), &gate);
            outside.update(1500.0, 400.0, ts, &viewport(), &gate);
        }
        assert!(inside.value() > outside.value());
    }

    #[test]
    fn axis_score_soft_margin() {
        let model = StreamingConfidence::default();
        // 32 px or deeper inside an edge: full score.
        assert_eq!(model.axis_score(32.0, 1000.0), 1.0);
        assert_eq!(model.axis_score(500.0, 1000.0), 1.0);
        // On the edge: half score.
        assert!((model.axis_score(0.0, 1000.0) - 0.5).abs() < 1e-12);
        // 32 px outside: zero.
        assert_eq!(model.axis_score(-32.0, 1000.0), 0.0);
        assert_eq!(model.axis_score(1032.0, 1000.0), 0.0);
    }

    #[test]
    fn reopening_gate_recovers_from_floor() {
        let gate = AttentionGate::default();
        let mut model = StreamingConfidence::default();

        gate.set_visible(false);
        centered_update(&mut model, 0, &gate);
        assert_eq!(model.value(), 0.3);

        gate.set_visible(true);
        for i in 1..60 {
            centered_update(&mut model, i * 16, &gate);
        }
        assert!(model.value() > 0.8);
    }

    #[test]
    fn config_json_roundtrip() {
        let config = StreamingConfidenceConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let restored: StreamingConfidenceConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, config);
    }
}
