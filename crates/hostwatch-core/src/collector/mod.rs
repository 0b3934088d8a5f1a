//! Host metrics collection.
//!
//! The sampler only depends on the [`Probe`] trait. This module also ships
//! the Linux implementation and the test doubles.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 ProcfsProbe                  │
//! │  - /proc/stat      (cpu %)                   │
//! │  - /proc/meminfo   (mem %)                   │
//! │  - statvfs(path)   (disk %)                  │
//! │  - /proc/net/dev   (net counters)            │
//! │  - /proc/[pid]/stat via ProcessLister        │
//! └──────────────────────┬───────────────────────┘
//!                        │
//!                 ┌──────▼──────┐
//!                 │  FileSystem │ (trait)
//!                 └──────┬──────┘
//!             ┌──────────┴──────────┐
//!       ┌─────▼─────┐         ┌─────▼─────┐
//!       │  RealFs   │         │  MockFs   │
//!       │ (Linux)   │         │ (Testing) │
//!       └───────────┘         └───────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use hostwatch_core::collector::{MockFs, Probe, ProcfsProbe};
//! use std::time::Duration;
//!
//! let fs = MockFs::typical_system();
//! let mut probe = ProcfsProbe::new(fs, "/proc").with_cpu_window(Duration::ZERO);
//! let sample = probe.sample().unwrap();
//! assert!(!sample.processes.is_empty());
//! ```

#[allow(clippy::module_inception)]
mod collector;
pub mod mock;
mod probe;
pub mod procfs;
pub mod traits;

pub use collector::{DEFAULT_CPU_WINDOW, ProbeTiming, ProcfsProbe};
pub use mock::{MockFs, ScriptedProbe, Step};
pub use probe::{Probe, ProbeError};
pub use traits::{DiskUsage, FileSystem, RealFs};
