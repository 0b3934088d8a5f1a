//! Aggregate view handed to consumers after every successful tick.

use serde::{Deserialize, Serialize};

use super::sample::HostSample;

/// Latest sample plus the contents of every rolling window.
///
/// Built fresh by the sampler on each tick and shared behind an `Arc`; it is
/// never mutated after publication, so readers cannot observe a torn update.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct MetricsSnapshot {
    /// Publication counter, strictly increasing. `0` marks the unstarted sentinel.
    pub sequence: u64,
    /// The sample this snapshot was built from.
    pub sample: Option<HostSample>,
    /// CPU percent, oldest first.
    pub cpu: Vec<f64>,
    /// Memory percent, oldest first.
    pub mem: Vec<f64>,
    /// Cumulative bytes sent, oldest first.
    pub net_sent: Vec<u64>,
    /// Cumulative bytes received, oldest first.
    pub net_recv: Vec<u64>,
}

impl MetricsSnapshot {
    /// The value returned by `latest()` before the first tick.
    pub fn unstarted() -> Self {
        Self::default()
    }

    pub fn is_unstarted(&self) -> bool {
        self.sequence == 0
    }

    /// Timestamp of the underlying sample (Unix millis).
    pub fn taken_at(&self) -> Option<i64> {
        self.sample.as_ref().map(|s| s.taken_at)
    }

    /// Number of points currently held in the windows.
    pub fn window_len(&self) -> usize {
        self.cpu.len()
    }
}
