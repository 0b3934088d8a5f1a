//! Fan-out of sampler results to any number of consumers.
//!
//! Two read paths are offered:
//! - [`SnapshotPublisher::latest`] returns the newest snapshot at any time,
//!   including the unstarted sentinel before the first tick.
//! - [`SnapshotPublisher::subscribe`] returns a per-consumer [`Subscription`]
//!   yielding every event published after the call.
//!
//! A subscriber that falls behind loses older events instead of slowing the
//! sampler down: each subscription buffers at most [`SUBSCRIBER_BACKLOG`]
//! events, which is what a single tick can emit. A buffered snapshot that a
//! newer one has already replaced is skipped on read, so a slow consumer
//! only ever sees the latest snapshot.

use std::sync::{Arc, Mutex, MutexGuard};

use futures_core::Stream;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{broadcast, watch};

use crate::collector::ProbeError;
use crate::storage::MetricsSnapshot;

/// Events retained per subscriber: a failed tick emits a failure and at most
/// one degraded advisory.
pub const SUBSCRIBER_BACKLOG: usize = 2;

/// Something a consumer may observe on its subscription.
#[derive(Debug, Clone)]
pub enum SamplerEvent {
    /// A tick succeeded and produced this snapshot.
    Snapshot(Arc<MetricsSnapshot>),
    /// A tick was skipped because the probe failed.
    SampleFailed { tick: u64, cause: ProbeError },
    /// Advisory: the probe has failed this many times in a row.
    ProbeDegraded {
        consecutive_failures: u32,
        last_cause: ProbeError,
    },
}

impl SamplerEvent {
    pub fn as_snapshot(&self) -> Option<&Arc<MetricsSnapshot>> {
        match self {
            SamplerEvent::Snapshot(snap) => Some(snap),
            _ => None,
        }
    }
}

struct Shared {
    latest: watch::Sender<Arc<MetricsSnapshot>>,
    /// `None` once closed. Held while publishing so that `close` and
    /// `publish` never interleave.
    events: Mutex<Option<broadcast::Sender<SamplerEvent>>>,
}

/// Publishes immutable snapshots and sampler events.
///
/// Cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct SnapshotPublisher {
    shared: Arc<Shared>,
}

impl Default for SnapshotPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotPublisher {
    pub fn new() -> Self {
        let (latest, _) = watch::channel(Arc::new(MetricsSnapshot::unstarted()));
        let (events, _) = broadcast::channel(SUBSCRIBER_BACKLOG);
        Self {
            shared: Arc::new(Shared {
                latest,
                events: Mutex::new(Some(events)),
            }),
        }
    }

    fn events(&self) -> MutexGuard<'_, Option<broadcast::Sender<SamplerEvent>>> {
        self.shared
            .events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Most recently published snapshot, or the unstarted sentinel.
    pub fn latest(&self) -> Arc<MetricsSnapshot> {
        Arc::clone(&self.shared.latest.borrow())
    }

    /// Publishes a snapshot to `latest()` and to every subscriber.
    ///
    /// Returns `false` without publishing when the publisher is closed or the
    /// snapshot's sequence does not advance past the current one.
    pub fn publish(&self, snapshot: MetricsSnapshot) -> bool {
        let events = self.events();
        let Some(tx) = events.as_ref() else {
            return false;
        };

        let snapshot = Arc::new(snapshot);
        let accepted = self.shared.latest.send_if_modified(|current| {
            if snapshot.sequence > current.sequence {
                *current = Arc::clone(&snapshot);
                true
            } else {
                false
            }
        });

        if accepted {
            // No subscribers is not an error.
            let _ = tx.send(SamplerEvent::Snapshot(snapshot));
        }
        accepted
    }

    /// Sends a non-snapshot event to subscribers. `false` if closed.
    pub fn notify(&self, event: SamplerEvent) -> bool {
        match self.events().as_ref() {
            Some(tx) => {
                let _ = tx.send(event);
                true
            }
            None => false,
        }
    }

    /// Opens a new subscription receiving events published from now on.
    ///
    /// Subscribing to a closed publisher yields an already-finished subscription.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.events().as_ref().map(|tx| tx.subscribe()),
            latest: self.shared.latest.subscribe(),
            dropped: 0,
        }
    }

    /// Ends every subscription and refuses further publishes. Idempotent.
    ///
    /// `latest()` keeps returning the last published snapshot.
    pub fn close(&self) {
        self.events().take();
    }

    pub fn is_closed(&self) -> bool {
        self.events().is_none()
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.events()
            .as_ref()
            .map_or(0, |tx| tx.receiver_count())
    }
}

/// A consumer's view of the event stream.
///
/// Finishes (returns `None`) once the publisher is closed and any buffered
/// events have been read.
pub struct Subscription {
    rx: Option<broadcast::Receiver<SamplerEvent>>,
    latest: watch::Receiver<Arc<MetricsSnapshot>>,
    dropped: u64,
}

/// A snapshot older than the publisher's latest one.
fn superseded(latest: &watch::Receiver<Arc<MetricsSnapshot>>, event: &SamplerEvent) -> bool {
    event
        .as_snapshot()
        .is_some_and(|snap| snap.sequence < latest.borrow().sequence)
}

impl Subscription {
    /// Waits for the next event. `None` once the stream has ended.
    pub async fn recv(&mut self) -> Option<SamplerEvent> {
        let rx = self.rx.as_mut()?;
        loop {
            match rx.recv().await {
                Ok(event) if superseded(&self.latest, &event) => self.dropped += 1,
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(n)) => self.dropped += n,
                Err(RecvError::Closed) => {
                    self.rx = None;
                    return None;
                }
            }
        }
    }

    /// Returns the next buffered event without waiting.
    pub fn try_recv(&mut self) -> Option<SamplerEvent> {
        let rx = self.rx.as_mut()?;
        loop {
            match rx.try_recv() {
                Ok(event) if superseded(&self.latest, &event) => self.dropped += 1,
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(n)) => self.dropped += n,
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Closed) => {
                    self.rx = None;
                    return None;
                }
            }
        }
    }

    /// `true` once the stream has ended.
    pub fn is_finished(&self) -> bool {
        self.rx.is_none()
    }

    /// Events skipped because this subscriber fell behind.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Converts the subscription into a `Stream`.
    pub fn into_stream(mut self) -> impl Stream<Item = SamplerEvent> + Send {
        async_stream::stream! {
            while let Some(event) = self.recv().await {
                yield event;
            }
        }
    }
}
