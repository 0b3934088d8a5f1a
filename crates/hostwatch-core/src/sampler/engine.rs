//! Per-tick bookkeeping: rolling windows, sequence numbers, failure tracking.
//!
//! [`Sampler`] is synchronous and owns no timer. The async loop in
//! [`super::runner`] feeds it one probe result per tick; tests drive it
//! directly.

use tracing::{info, warn};

use crate::collector::ProbeError;
use crate::publisher::{SamplerEvent, SnapshotPublisher};
use crate::sampler::config::{InvalidConfig, SamplerConfig};
use crate::storage::{HostSample, MetricsSnapshot, RingBuffer};

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A snapshot with this sequence number was published.
    Published { sequence: u64 },
    /// The probe failed; nothing was appended.
    Failed {
        consecutive_failures: u32,
        /// `true` on the tick that crossed the degraded threshold.
        degraded: bool,
    },
    /// The publisher was already closed; the result was thrown away.
    Discarded,
}

/// Rolling windows plus the state needed to publish them.
pub struct Sampler {
    cpu: RingBuffer<f64>,
    mem: RingBuffer<f64>,
    net_sent: RingBuffer<u64>,
    net_recv: RingBuffer<u64>,
    sequence: u64,
    ticks: u64,
    consecutive_failures: u32,
    degraded_threshold: u32,
    publisher: SnapshotPublisher,
}

impl Sampler {
    pub fn new(config: &SamplerConfig, publisher: SnapshotPublisher) -> Result<Self, InvalidConfig> {
        config.validate()?;
        Ok(Self {
            cpu: RingBuffer::new(config.capacity)?,
            mem: RingBuffer::new(config.capacity)?,
            net_sent: RingBuffer::new(config.capacity)?,
            net_recv: RingBuffer::new(config.capacity)?,
            sequence: 0,
            ticks: 0,
            consecutive_failures: 0,
            degraded_threshold: config.degraded_threshold,
            publisher,
        })
    }

    /// Applies one probe result.
    ///
    /// A success appends to every window and publishes a new snapshot. A
    /// failure leaves the windows untouched and emits `SampleFailed`, plus a
    /// single `ProbeDegraded` when the run of failures reaches the threshold.
    pub fn record(&mut self, result: Result<HostSample, ProbeError>) -> TickOutcome {
        self.ticks += 1;
        if self.publisher.is_closed() {
            return TickOutcome::Discarded;
        }

        match result {
            Ok(sample) => self.record_sample(sample),
            Err(cause) => self.record_failure(cause),
        }
    }

    fn record_sample(&mut self, sample: HostSample) -> TickOutcome {
        if self.consecutive_failures > 0 {
            info!(
                tick = self.ticks,
                failures = self.consecutive_failures,
                "probe recovered"
            );
            self.consecutive_failures = 0;
        }

        self.cpu.push(sample.cpu_percent);
        self.mem.push(sample.mem_percent);
        self.net_sent.push(sample.net_bytes_sent);
        self.net_recv.push(sample.net_bytes_recv);
        self.sequence += 1;

        let snapshot = self.build_snapshot(Some(sample));
        if self.publisher.publish(snapshot) {
            TickOutcome::Published {
                sequence: self.sequence,
            }
        } else {
            TickOutcome::Discarded
        }
    }

    fn record_failure(&mut self, cause: ProbeError) -> TickOutcome {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        warn!(
            tick = self.ticks,
            consecutive = self.consecutive_failures,
            error = %cause,
            "sample failed, tick skipped"
        );

        let degraded = self.consecutive_failures == self.degraded_threshold;
        self.publisher.notify(SamplerEvent::SampleFailed {
            tick: self.ticks,
            cause: cause.clone(),
        });
        if degraded {
            warn!(
                consecutive = self.consecutive_failures,
                error = %cause,
                "probe degraded"
            );
            self.publisher.notify(SamplerEvent::ProbeDegraded {
                consecutive_failures: self.consecutive_failures,
                last_cause: cause,
            });
        }

        TickOutcome::Failed {
            consecutive_failures: self.consecutive_failures,
            degraded,
        }
    }

    fn build_snapshot(&self, sample: Option<HostSample>) -> MetricsSnapshot {
        MetricsSnapshot {
            sequence: self.sequence,
            sample,
            cpu: self.cpu.snapshot(),
            mem: self.mem.snapshot(),
            net_sent: self.net_sent.snapshot(),
            net_recv: self.net_recv.snapshot(),
        }
    }

    /// Sequence number of the last published snapshot (`0` before any).
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Ticks recorded so far, successful or not.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn publisher(&self) -> &SnapshotPublisher {
        &self.publisher
    }
}
