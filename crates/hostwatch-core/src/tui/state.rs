//! Application state management.

use std::sync::Arc;
use std::time::Duration;

use crate::fmt::format_interval;
use crate::publisher::SamplerEvent;
use crate::storage::MetricsSnapshot;

/// Available tabs in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Metrics,
    Graphs,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[Tab::Metrics, Tab::Graphs]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tab::Metrics => "Metrics",
            Tab::Graphs => "Graphs",
        }
    }

    pub fn next(&self) -> Tab {
        match self {
            Tab::Metrics => Tab::Graphs,
            Tab::Graphs => Tab::Metrics,
        }
    }
}

/// Severity of the status line message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

/// Main application state.
#[derive(Debug)]
pub struct AppState {
    pub current_tab: Tab,
    /// Newest snapshot seen (the unstarted sentinel until the first tick).
    pub snapshot: Arc<MetricsSnapshot>,
    /// Current sampling interval, as last read from the sampler.
    pub interval: Duration,
    /// First visible row of the process table.
    pub process_scroll: usize,
    /// Visible process rows, updated on render.
    pub page_size: usize,
    pub status: Option<Status>,
    /// Ticks have failed since the last published snapshot.
    failing: bool,
    /// A degraded advisory arrived during the current failure run.
    degraded: bool,
}

impl AppState {
    pub fn new(interval: Duration) -> Self {
        Self {
            current_tab: Tab::default(),
            snapshot: Arc::new(MetricsSnapshot::unstarted()),
            interval,
            process_scroll: 0,
            page_size: 10,
            status: None,
            failing: false,
            degraded: false,
        }
    }

    pub fn process_count(&self) -> usize {
        self.snapshot
            .sample
            .as_ref()
            .map_or(0, |s| s.processes.len())
    }

    /// Takes a newer snapshot; older or equal sequences are ignored.
    pub fn apply_snapshot(&mut self, snapshot: Arc<MetricsSnapshot>) {
        if snapshot.sequence <= self.snapshot.sequence {
            return;
        }
        self.snapshot = snapshot;
        self.clamp_scroll();
    }

    /// Reflects a sampler event in the status line.
    pub fn apply_event(&mut self, event: &SamplerEvent) {
        match event {
            SamplerEvent::Snapshot(snap) => {
                if self.failing {
                    self.set_status(StatusKind::Info, "sampling resumed");
                }
                self.failing = false;
                self.degraded = false;
                self.apply_snapshot(Arc::clone(snap));
            }
            SamplerEvent::SampleFailed { tick, cause } => {
                self.failing = true;
                // Keep a degraded advisory visible until recovery.
                if self.degraded {
                    return;
                }
                self.set_status(
                    StatusKind::Warning,
                    format!("tick {} skipped: {}", tick, cause.reason()),
                );
            }
            SamplerEvent::ProbeDegraded {
                consecutive_failures,
                last_cause,
            } => {
                self.failing = true;
                self.degraded = true;
                self.set_status(
                    StatusKind::Error,
                    format!(
                        "probe degraded: {} consecutive failures ({})",
                        consecutive_failures,
                        last_cause.reason()
                    ),
                );
            }
        }
    }

    /// `true` while a degraded advisory is waiting for a successful tick.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some(Status {
            kind,
            text: text.into(),
        });
    }

    /// Records the outcome of an interval change request.
    pub fn interval_changed(&mut self, interval: Duration) {
        self.interval = interval;
        self.set_status(
            StatusKind::Info,
            format!("refresh every {}", format_interval(interval)),
        );
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.process_scroll = self.process_scroll.saturating_sub(n);
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.process_scroll = self.process_scroll.saturating_add(n);
        self.clamp_scroll();
    }

    pub fn scroll_home(&mut self) {
        self.process_scroll = 0;
    }

    pub fn scroll_end(&mut self) {
        self.process_scroll = self.max_scroll();
    }

    fn max_scroll(&self) -> usize {
        self.process_count().saturating_sub(self.page_size.max(1))
    }

    fn clamp_scroll(&mut self) {
        self.process_scroll = self.process_scroll.min(self.max_scroll());
    }
}
