//! Periodic sampling: configuration, per-tick engine, async driver.
//!
//! - [`SamplerConfig`] - cadence and window settings, validated up front
//! - [`Sampler`] - applies one probe result per tick to the rolling windows
//! - [`SamplerLoop`] / [`SamplerHandle`] - runs the ticks on a Tokio runtime

mod config;
mod engine;
mod runner;

pub use config::{
    DEFAULT_DEGRADED_THRESHOLD, DEFAULT_INTERVAL_MS, DEFAULT_PROBE_TIMEOUT_MS, InvalidConfig,
    MAX_INTERVAL_MS, MIN_INTERVAL_MS, SamplerConfig, validate_interval,
};
pub use engine::{Sampler, TickOutcome};
pub use runner::{SamplerHandle, SamplerLoop, next_deadline};
