//! Async driver for the sampler: cadence, cancellation, probe isolation.
//!
//! ```text
//!   SamplerHandle ──set_interval──► watch<u32> ──┐
//!        │                                        ▼
//!        └──stop──► CancellationToken ──► run loop ──spawn_blocking──► Probe
//!                                            │
//!                                            ▼
//!                                   Sampler::record ──► SnapshotPublisher
//! ```
//!
//! The first tick runs as soon as the loop starts. Each later tick is due
//! `interval` after the previous one *started*; if that moment has already
//! passed the tick runs right away, and missed ticks are never replayed.

use std::sync::{Arc, Mutex, TryLockError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::collector::{Probe, ProbeError};
use crate::publisher::{SnapshotPublisher, Subscription};
use crate::sampler::config::{InvalidConfig, SamplerConfig, validate_interval};
use crate::sampler::engine::{Sampler, TickOutcome};
use crate::storage::{HostSample, MetricsSnapshot};

/// Builder for a running sampler.
pub struct SamplerLoop<P: Probe> {
    probe: P,
    config: SamplerConfig,
    publisher: SnapshotPublisher,
}

impl<P: Probe> SamplerLoop<P> {
    pub fn new(probe: P, config: SamplerConfig) -> Self {
        Self {
            probe,
            config,
            publisher: SnapshotPublisher::new(),
        }
    }

    /// Publishes through an existing publisher, so subscriptions taken
    /// before `start` see the first tick.
    pub fn with_publisher(mut self, publisher: SnapshotPublisher) -> Self {
        self.publisher = publisher;
        self
    }

    /// Validates the configuration and spawns the loop on the current Tokio
    /// runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start(self) -> Result<SamplerHandle, InvalidConfig> {
        let sampler = Sampler::new(&self.config, self.publisher.clone())?;
        let (interval_tx, interval_rx) = watch::channel(self.config.interval_ms);
        let cancel = CancellationToken::new();

        info!(
            interval_ms = self.config.interval_ms,
            capacity = self.config.capacity,
            probe_timeout_ms = self.config.probe_timeout_ms,
            "sampler started"
        );

        let task = tokio::spawn(run(
            sampler,
            Arc::new(Mutex::new(self.probe)),
            interval_rx,
            self.config.probe_timeout(),
            cancel.clone(),
        ));

        Ok(SamplerHandle {
            inner: Arc::new(HandleInner {
                publisher: self.publisher,
                interval_tx,
                cancel,
                task: Mutex::new(Some(task)),
            }),
        })
    }
}

struct HandleInner {
    publisher: SnapshotPublisher,
    interval_tx: watch::Sender<u32>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for HandleInner {
    fn drop(&mut self) {
        // Last handle gone: nobody can stop the loop any more.
        self.publisher.close();
        self.cancel.cancel();
    }
}

/// Control and read access to a running sampler. Cheap to clone.
///
/// Dropping the last clone stops the loop.
#[derive(Clone)]
pub struct SamplerHandle {
    inner: Arc<HandleInner>,
}

impl SamplerHandle {
    /// Most recent snapshot, or the unstarted sentinel.
    pub fn latest(&self) -> Arc<MetricsSnapshot> {
        self.inner.publisher.latest()
    }

    pub fn subscribe(&self) -> Subscription {
        self.inner.publisher.subscribe()
    }

    /// Changes the cadence starting with the next tick.
    ///
    /// Out-of-range values are rejected and the current interval is kept.
    pub fn set_interval(&self, millis: u32) -> Result<(), InvalidConfig> {
        let millis = validate_interval(millis)?;
        let previous = self.inner.interval_tx.send_replace(millis);
        if previous != millis {
            info!(from_ms = previous, to_ms = millis, "sampling interval changed");
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        millis(*self.inner.interval_tx.borrow())
    }

    pub fn is_running(&self) -> bool {
        !self.inner.cancel.is_cancelled()
    }

    /// Stops ticking and ends every subscription. Idempotent.
    ///
    /// A probe call already in flight finishes in the background; its
    /// result is discarded.
    pub fn stop(&self) {
        if self.inner.cancel.is_cancelled() {
            return;
        }
        // Closed first, so a result racing with the cancellation is refused.
        self.inner.publisher.close();
        self.inner.cancel.cancel();
        info!("sampler stop requested");
    }

    /// Stops the loop and waits for its task to exit.
    pub async fn shutdown(&self) {
        self.stop();
        let task = self
            .inner
            .task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(task) = task
            && let Err(e) = task.await
        {
            error!(error = %e, "sampler task failed");
        }
    }
}

fn millis(ms: u32) -> Duration {
    Duration::from_millis(u64::from(ms))
}

/// When the tick after one that started at `previous_start` is due.
pub fn next_deadline(previous_start: Instant, interval: Duration, now: Instant) -> Instant {
    (previous_start + interval).max(now)
}

/// Whether a probe call is worth a warning. The first call is exempt: it
/// includes the probe's warm-up, such as the initial CPU window.
fn is_slow_tick(first: bool, elapsed: Duration, interval: Duration) -> bool {
    !first && elapsed > interval / 2
}

async fn run<P: Probe>(
    mut sampler: Sampler,
    probe: Arc<Mutex<P>>,
    mut interval_rx: watch::Receiver<u32>,
    probe_timeout: Duration,
    cancel: CancellationToken,
) {
    let mut previous_start: Option<Instant> = None;
    let mut interval_open = true;

    'ticks: loop {
        if let Some(started) = previous_start {
            loop {
                let interval = millis(*interval_rx.borrow_and_update());
                let deadline = next_deadline(started, interval, Instant::now());
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break 'ticks,
                    changed = interval_rx.changed(), if interval_open => {
                        // Re-anchor against the new interval.
                        if changed.is_err() {
                            interval_open = false;
                        }
                    }
                    _ = tokio::time::sleep_until(deadline) => break,
                }
            }
        }

        let first = previous_start.is_none();
        let started = Instant::now();
        previous_start = Some(started);

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => break 'ticks,
            result = probe_once(Arc::clone(&probe), probe_timeout) => result,
        };
        if cancel.is_cancelled() {
            break;
        }

        let elapsed = started.elapsed();
        let interval = millis(*interval_rx.borrow());
        if is_slow_tick(first, elapsed, interval) {
            warn!(
                duration_ms = elapsed.as_millis() as u64,
                interval_ms = interval.as_millis() as u64,
                "probe call took more than half the interval"
            );
        }

        match sampler.record(result) {
            TickOutcome::Published { sequence: 1 } => info!(
                duration_ms = elapsed.as_millis() as u64,
                "first snapshot published"
            ),
            TickOutcome::Published { sequence } => debug!(
                duration_ms = elapsed.as_millis() as u64,
                sequence,
                "snapshot published"
            ),
            TickOutcome::Failed { .. } => {}
            TickOutcome::Discarded => break,
        }
    }

    info!(
        ticks = sampler.ticks(),
        published = sampler.sequence(),
        "sampler stopped"
    );
}

/// Runs one probe call on the blocking pool, bounded by `timeout`.
///
/// A call that times out keeps running and holds the probe; ticks that
/// arrive meanwhile fail with `Busy` instead of queueing behind it.
async fn probe_once<P: Probe>(
    probe: Arc<Mutex<P>>,
    timeout: Duration,
) -> Result<HostSample, ProbeError> {
    let call = tokio::task::spawn_blocking(move || {
        let mut guard = match probe.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => return Err(ProbeError::Busy),
            Err(TryLockError::Poisoned(poisoned)) => {
                warn!("recovering probe after an earlier panic");
                probe.clear_poison();
                poisoned.into_inner()
            }
        };
        guard.sample()
    });

    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(ProbeError::Panicked(join_err.to_string())),
        Err(_) => Err(ProbeError::Timeout(timeout)),
    }
}
