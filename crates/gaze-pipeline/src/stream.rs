//! Consumer-facing gaze sample stream.
//!
//! Emission crosses the processing/consumer boundary through a bounded
//! channel: per-stream ordering is preserved, consumers may lag
//! arbitrarily, and a full channel drops the new sample (counted) rather
//! than ever blocking the processing flow.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use gaze_core::GazeData;
use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Default bound of the emission channel.
pub const DEFAULT_STREAM_CAPACITY: usize = 64;

/// Bounded, order-preserving stream of [`GazeData`] samples.
///
/// Receiver handles share the stream: each sample is delivered to exactly
/// one receiving handle.
#[derive(Debug, Clone)]
pub struct GazeStream {
    sender: Sender<GazeData>,
    receiver: Receiver<GazeData>,
    dropped: Arc<AtomicU64>,
}

impl GazeStream {
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Offer a sample to consumers. Returns `false` (and counts the drop)
    /// when the channel is full or all external receivers are gone.
    pub fn emit(&self, sample: GazeData) -> bool {
        match self.sender.try_send(sample) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                debug!("gaze stream full, sample dropped");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// A new receiving handle onto the stream.
    pub fn subscribe(&self) -> Receiver<GazeData> {
        self.receiver.clone()
    }

    /// Samples dropped because no channel slot was available.
    pub fn dropped_samples(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Default for GazeStream {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_STREAM_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ts: u64) -> GazeData {
        GazeData {
            x: 1.0,
            y: 2.0,
            confidence: 0.5,
            timestamp_ms: ts,
        }
    }

    #[test]
    fn samples_arrive_in_order() {
        let stream = GazeStream::with_capacity(8);
        let rx = stream.subscribe();

        for ts in 0..5 {
            assert!(stream.emit(sample(ts)));
        }
        let received: Vec<u64> = rx.try_iter().map(|s| s.timestamp_ms).collect();
        assert_eq!(received, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn full_channel_drops_and_counts() {
        let stream = GazeStream::with_capacity(2);
        let _rx = stream.subscribe();

        assert!(stream.emit(sample(0)));
        assert!(stream.emit(sample(1)));
        assert!(!stream.emit(sample(2)));
        assert_eq!(stream.dropped_samples(), 1);

        // Draining frees capacity again.
        let rx = stream.subscribe();
        rx.try_recv().unwrap();
        assert!(stream.emit(sample(3)));
    }
}
