//! hostwatch-core - bounded-history host metrics sampler.
//!
//! Provides:
//! - `collector`: the `Probe` seam, `/proc` parsers and the production probe
//! - `storage`: ring buffers and the sample/snapshot models
//! - `sampler`: configuration, per-tick engine and the async sampling loop
//! - `publisher`: latest-snapshot cell and per-consumer event streams
//! - `fmt`: shared formatting helpers
//!
//! With `tui` feature (default):
//! - `tui`: terminal front end (ratatui/crossterm)

pub mod collector;
pub mod fmt;
pub mod publisher;
pub mod sampler;
pub mod storage;

#[cfg(feature = "tui")]
pub mod tui;

pub use collector::{Probe, ProbeError};
pub use publisher::{SamplerEvent, SnapshotPublisher, Subscription};
pub use sampler::{InvalidConfig, SamplerConfig, SamplerHandle, SamplerLoop};
pub use storage::{HostSample, MetricsSnapshot, ProcessInfo, RingBuffer};
