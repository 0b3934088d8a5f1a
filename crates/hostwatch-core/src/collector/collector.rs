//! Production probe reading `/proc` and `statvfs`.
//!
//! `ProcfsProbe` combines the `/proc` parsers and the process lister into a
//! single `Probe` that produces complete `HostSample`s.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::trace;

use crate::collector::probe::{Probe, ProbeError};
use crate::collector::procfs::parser::{
    CpuTimes, parse_cpu_times, parse_meminfo, parse_net_dev,
};
use crate::collector::procfs::ProcessLister;
use crate::collector::traits::FileSystem;
use crate::storage::model::{HostSample, now_millis};

/// Default window the first CPU reading is averaged over.
pub const DEFAULT_CPU_WINDOW: Duration = Duration::from_secs(1);

/// Timing information for each probe phase.
#[derive(Debug, Clone, Default)]
pub struct ProbeTiming {
    /// Total sample time.
    pub total: Duration,
    /// Time to read CPU counters, including the first-sample window.
    pub cpu: Duration,
    pub meminfo: Duration,
    pub disk: Duration,
    pub netdev: Duration,
    pub processes: Duration,
}

/// Probe backed by a `/proc` filesystem.
pub struct ProcfsProbe<F: FileSystem> {
    fs: F,
    proc_path: String,
    disk_path: PathBuf,
    cpu_window: Duration,
    prev_cpu: Option<CpuTimes>,
    lister: ProcessLister,
    last_timing: Option<ProbeTiming>,
}

impl<F: FileSystem> ProcfsProbe<F> {
    /// Creates a probe reading from `proc_path` and reporting disk usage of `/`.
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        let proc_path = proc_path.into();
        Self {
            fs,
            lister: ProcessLister::new(proc_path.clone()),
            proc_path,
            disk_path: PathBuf::from("/"),
            cpu_window: DEFAULT_CPU_WINDOW,
            prev_cpu: None,
            last_timing: None,
        }
    }

    /// Mount point whose usage is reported as `disk_percent`.
    pub fn with_disk_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.disk_path = path.into();
        self
    }

    /// Window the first CPU reading blocks for, when no baseline exists yet.
    pub fn with_cpu_window(mut self, window: Duration) -> Self {
        self.cpu_window = window;
        self
    }

    /// Overrides the page size used for RSS conversion.
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.lister = self.lister.with_page_size(page_size);
        self
    }

    /// Returns timing information from the last `sample` call.
    pub fn last_timing(&self) -> Option<&ProbeTiming> {
        self.last_timing.as_ref()
    }

    fn read(&self, name: &str) -> Result<(String, String), ProbeError> {
        let path = format!("{}/{}", self.proc_path, name);
        let content = self
            .fs
            .read_to_string(Path::new(&path))
            .map_err(|e| ProbeError::read(&path, e))?;
        Ok((path, content))
    }

    fn read_cpu_times(&self) -> Result<CpuTimes, ProbeError> {
        let (path, content) = self.read("stat")?;
        parse_cpu_times(&content).map_err(|e| ProbeError::Parse(format!("{}: {}", path, e.message)))
    }

    /// CPU busy percent since the previous call.
    ///
    /// Without a baseline, takes one and blocks for the CPU window first.
    fn cpu_percent(&mut self) -> Result<f64, ProbeError> {
        let baseline = match self.prev_cpu {
            Some(prev) => prev,
            None => {
                let first = self.read_cpu_times()?;
                if !self.cpu_window.is_zero() {
                    std::thread::sleep(self.cpu_window);
                }
                first
            }
        };
        let current = self.read_cpu_times()?;
        self.prev_cpu = Some(current);
        Ok(current.busy_percent_since(&baseline))
    }

    fn mem_percent(&self) -> Result<f64, ProbeError> {
        let (path, content) = self.read("meminfo")?;
        let info = parse_meminfo(&content)
            .map_err(|e| ProbeError::Parse(format!("{}: {}", path, e.message)))?;
        Ok(info.used_percent())
    }

    fn disk_percent(&self) -> Result<f64, ProbeError> {
        let usage = self
            .fs
            .disk_usage(&self.disk_path)
            .map_err(|e| ProbeError::read(self.disk_path.display().to_string(), e))?;
        Ok(usage.percent())
    }

    /// Cumulative (sent, received) bytes across all interfaces.
    fn net_totals(&self) -> Result<(u64, u64), ProbeError> {
        let (path, content) = self.read("net/dev")?;
        let devices = parse_net_dev(&content)
            .map_err(|e| ProbeError::Parse(format!("{}: {}", path, e.message)))?;
        Ok(devices.iter().fold((0u64, 0u64), |(tx, rx), dev| {
            (tx.saturating_add(dev.tx_bytes), rx.saturating_add(dev.rx_bytes))
        }))
    }
}

impl<F: FileSystem + 'static> Probe for ProcfsProbe<F> {
    fn sample(&mut self) -> Result<HostSample, ProbeError> {
        let start = Instant::now();
        let mut timing = ProbeTiming::default();

        let t = Instant::now();
        let cpu_percent = self.cpu_percent()?;
        timing.cpu = t.elapsed();

        let t = Instant::now();
        let mem_percent = self.mem_percent()?;
        timing.meminfo = t.elapsed();

        let t = Instant::now();
        let disk_percent = self.disk_percent()?;
        timing.disk = t.elapsed();

        let t = Instant::now();
        let (net_bytes_sent, net_bytes_recv) = self.net_totals()?;
        timing.netdev = t.elapsed();

        let t = Instant::now();
        let processes = self.lister.collect_all(&self.fs)?;
        timing.processes = t.elapsed();

        timing.total = start.elapsed();
        trace!(
            total_us = timing.total.as_micros() as u64,
            cpu_us = timing.cpu.as_micros() as u64,
            processes_us = timing.processes.as_micros() as u64,
            process_count = processes.len(),
            "procfs sample collected"
        );
        self.last_timing = Some(timing);

        Ok(HostSample {
            cpu_percent,
            mem_percent,
            disk_percent,
            net_bytes_sent,
            net_bytes_recv,
            processes,
            taken_at: now_millis(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    fn probe(fs: MockFs) -> ProcfsProbe<MockFs> {
        ProcfsProbe::new(fs, "/proc")
            .with_cpu_window(Duration::ZERO)
            .with_page_size(4096)
    }

    #[test]
    fn test_sample_typical_system() {
        let mut probe = probe(MockFs::typical_system());
        let sample = probe.sample().unwrap();

        // No time passed between the two baseline reads.
        assert_eq!(sample.cpu_percent, 0.0);
        assert!((sample.mem_percent - 25.0).abs() < 1e-9);
        assert!((sample.disk_percent - 25.0).abs() < 1e-9);
        assert_eq!(sample.net_bytes_sent, 1_000_000 + 10_485_760);
        assert_eq!(sample.net_bytes_recv, 1_000_000 + 52_428_800);
        assert_eq!(sample.processes.len(), 3);
        assert_eq!(sample.processes[0].name, "systemd");
        assert!(sample.taken_at > 0);
        assert!(probe.last_timing().is_some());
    }

    #[test]
    fn test_cpu_percent_uses_previous_reading() {
        let fs = MockFs::typical_system();
        let mut handle = fs.clone();
        handle.set_cpu_times(1000, 0, 9000);

        let mut probe = probe(fs);
        probe.sample().unwrap();

        // 300 busy jiffies out of 400 elapsed.
        handle.set_cpu_times(1200, 100, 9100);
        let sample = probe.sample().unwrap();
        assert!((sample.cpu_percent - 75.0).abs() < 1e-9);

        // Fully idle interval.
        handle.set_cpu_times(1200, 100, 9500);
        assert_eq!(probe.sample().unwrap().cpu_percent, 0.0);
    }

    #[test]
    fn test_first_sample_blocks_for_cpu_window() {
        let mut probe = ProcfsProbe::new(MockFs::typical_system(), "/proc")
            .with_cpu_window(Duration::from_millis(30));
        let start = Instant::now();
        probe.sample().unwrap();
        assert!(start.elapsed() >= Duration::from_millis(30));

        // The second call has a baseline and does not wait again.
        let timing_cpu = {
            probe.sample().unwrap();
            probe.last_timing().unwrap().cpu
        };
        assert!(timing_cpu < Duration::from_millis(30));
    }

    #[test]
    fn test_missing_meminfo_fails_sample() {
        let fs = MockFs::typical_system();
        let mut handle = fs.clone();
        handle.remove_file("/proc/meminfo");

        let err = probe(fs).sample().unwrap_err();
        match err {
            ProbeError::Read { path, .. } => assert_eq!(path, "/proc/meminfo"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_corrupt_stat_is_parse_error() {
        let fs = MockFs::typical_system();
        let mut handle = fs.clone();
        handle.add_file("/proc/stat", "intr 1 2 3\n");

        let err = probe(fs).sample().unwrap_err();
        assert!(matches!(err, ProbeError::Parse(ref msg) if msg.starts_with("/proc/stat")));
    }

    #[test]
    fn test_unknown_disk_path_fails_sample() {
        let mut probe = probe(MockFs::typical_system()).with_disk_path("/data");
        let err = probe.sample().unwrap_err();
        assert!(matches!(err, ProbeError::Read { ref path, .. } if path == "/data"));
    }

    #[test]
    fn test_failed_sample_keeps_cpu_baseline() {
        let fs = MockFs::typical_system();
        let mut handle = fs.clone();
        handle.set_cpu_times(100, 0, 900);

        let mut probe = probe(fs);
        probe.sample().unwrap();

        handle.remove_file("/proc/net/dev");
        handle.set_cpu_times(150, 0, 950);
        assert!(probe.sample().is_err());

        handle.add_file(
            "/proc/net/dev",
            "  eth0: 1 0 0 0 0 0 0 0 2 0 0 0 0 0 0 0\n",
        );
        handle.set_cpu_times(250, 0, 1050);
        let sample = probe.sample().unwrap();
        // Delta against the reading taken during the failed call: 100 busy of 200.
        assert!((sample.cpu_percent - 50.0).abs() < 1e-9);
        assert_eq!(sample.net_bytes_sent, 2);
        assert_eq!(sample.net_bytes_recv, 1);
    }
}
