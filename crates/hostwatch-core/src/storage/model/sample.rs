//! Point-in-time host readings produced by a probe.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the process list.
///
/// Source: `/proc/[pid]/stat` (pid, comm, rss)
///
/// Rows carry no identity beyond the pid at the time of sampling: a pid
/// may vanish between samples and be reused by an unrelated process.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct ProcessInfo {
    pub pid: u32,
    /// Short process name (`comm`).
    pub name: String,
    /// Resident set size in bytes.
    pub resident_memory_bytes: u64,
}

impl ProcessInfo {
    pub fn new(pid: u32, name: impl Into<String>, resident_memory_bytes: u64) -> Self {
        Self {
            pid,
            name: name.into(),
            resident_memory_bytes,
        }
    }
}

/// A single consistent reading of the host.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct HostSample {
    /// Busy CPU time over the sampling window, 0..=100.
    pub cpu_percent: f64,
    /// Used share of physical memory, 0..=100.
    pub mem_percent: f64,
    /// Used share of the monitored filesystem, 0..=100.
    pub disk_percent: f64,
    /// Cumulative bytes sent across all interfaces.
    pub net_bytes_sent: u64,
    /// Cumulative bytes received across all interfaces.
    pub net_bytes_recv: u64,
    /// Process list ordered by pid.
    pub processes: Vec<ProcessInfo>,
    /// Unix timestamp in milliseconds.
    pub taken_at: i64,
}

impl HostSample {
    /// Sampling time as a UTC datetime, `None` if out of chrono's range.
    pub fn taken_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.taken_at)
    }

    /// Total resident memory across the process list, in bytes.
    pub fn total_resident_bytes(&self) -> u64 {
        self.processes
            .iter()
            .map(|p| p.resident_memory_bytes)
            .sum()
    }
}

/// Current wall clock as Unix milliseconds.
pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
