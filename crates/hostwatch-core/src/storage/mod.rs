//! In-memory storage: rolling windows and the value types they feed.
//!
//! Nothing here touches disk; the rolling windows are the only history kept.

pub mod model;
mod ring;

pub use model::{HostSample, MetricsSnapshot, ProcessInfo};
pub use ring::{DEFAULT_CAPACITY, RingBuffer};
