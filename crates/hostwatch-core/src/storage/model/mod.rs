//! Data model shared by the collector, sampler and front ends.
//!
//! # Structure
//!
//! ```text
//! MetricsSnapshot
//! ├── sequence: u64            (0 = nothing sampled yet)
//! ├── sample: Option<HostSample>
//! │   ├── cpu / mem / disk percent
//! │   ├── cumulative network counters
//! │   └── processes: Vec<ProcessInfo>
//! └── windows: cpu, mem, net_sent, net_recv
//! ```

mod sample;
mod snapshot;

pub(crate) use sample::now_millis;
pub use sample::{HostSample, ProcessInfo};
pub use snapshot::MetricsSnapshot;
