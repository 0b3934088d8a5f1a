//! Probe that replays a scripted sequence of outcomes.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::collector::probe::{Probe, ProbeError};
use crate::storage::model::HostSample;
use crate::storage::model::ProcessInfo;

/// One scripted probe outcome.
#[derive(Debug, Clone)]
pub enum Step {
    /// Return a synthetic sample.
    Succeed,
    /// Fail with the given error.
    Fail(ProbeError),
    /// Block for the duration, then succeed.
    Stall(Duration),
    /// Panic inside the probe call.
    Panic,
}

/// Deterministic probe for sampler tests.
///
/// The n-th call (1-based) that succeeds reports `cpu_percent = n`,
/// `mem_percent = 2n`, `net_bytes_sent = 100n`, `net_bytes_recv = 1000n`,
/// so tests can tell exactly which calls reached the buffers. Once the script
/// runs out every call succeeds.
#[derive(Debug, Default)]
pub struct ScriptedProbe {
    script: VecDeque<Step>,
    calls: Arc<AtomicU64>,
}

impl ScriptedProbe {
    pub fn new(script: impl IntoIterator<Item = Step>) -> Self {
        Self {
            script: script.into_iter().collect(),
            calls: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Script in which the listed 1-based calls fail and all others succeed.
    pub fn failing_on(calls: &[u64]) -> Self {
        let last = calls.iter().copied().max().unwrap_or(0);
        Self::new((1..=last).map(|n| {
            if calls.contains(&n) {
                Step::Fail(ProbeError::read("/proc/stat", "scripted failure"))
            } else {
                Step::Succeed
            }
        }))
    }

    /// Shared counter of calls made so far.
    pub fn call_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.calls)
    }

    fn synthetic(n: u64) -> HostSample {
        HostSample {
            cpu_percent: n as f64,
            mem_percent: (2 * n) as f64,
            disk_percent: 50.0,
            net_bytes_sent: 100 * n,
            net_bytes_recv: 1000 * n,
            processes: vec![ProcessInfo::new(1, "init", 4096 * n)],
            taken_at: crate::storage::model::now_millis(),
        }
    }
}

impl Probe for ScriptedProbe {
    fn sample(&mut self) -> Result<HostSample, ProbeError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        match self.script.pop_front().unwrap_or(Step::Succeed) {
            Step::Succeed => Ok(Self::synthetic(n)),
            Step::Fail(err) => Err(err),
            Step::Stall(d) => {
                std::thread::sleep(d);
                Ok(Self::synthetic(n))
            }
            Step::Panic => panic!("scripted probe panic on call {}", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failing_on_marks_listed_calls() {
        let mut probe = ScriptedProbe::failing_on(&[2, 3]);
        assert_eq!(probe.sample().unwrap().cpu_percent, 1.0);
        assert!(probe.sample().is_err());
        assert!(probe.sample().is_err());
        let fourth = probe.sample().unwrap();
        assert_eq!(fourth.cpu_percent, 4.0);
        assert_eq!(fourth.net_bytes_recv, 4000);
        assert_eq!(probe.call_counter().load(Ordering::SeqCst), 4);
    }

    #[test]
    fn exhausted_script_keeps_succeeding() {
        let mut probe = ScriptedProbe::new([]);
        for n in 1..=3 {
            assert_eq!(probe.sample().unwrap().mem_percent, (2 * n) as f64);
        }
    }
}
