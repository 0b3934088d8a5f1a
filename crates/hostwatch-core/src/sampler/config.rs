//! Sampler configuration and its validation.

use std::fmt;
use std::time::Duration;

use crate::storage::DEFAULT_CAPACITY;

/// Shortest allowed sampling interval.
pub const MIN_INTERVAL_MS: u32 = 1_000;
/// Longest allowed sampling interval.
pub const MAX_INTERVAL_MS: u32 = 60_000;
/// Refresh interval used when none is configured.
pub const DEFAULT_INTERVAL_MS: u32 = 2_000;
pub const DEFAULT_PROBE_TIMEOUT_MS: u32 = 5_000;
/// Consecutive probe failures that trigger a degraded advisory.
pub const DEFAULT_DEGRADED_THRESHOLD: u32 = 3;

/// Rejected configuration value. Returned synchronously to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidConfig {
    /// Interval outside `MIN_INTERVAL_MS..=MAX_INTERVAL_MS`.
    IntervalOutOfRange { millis: u32 },
    /// Rolling windows must hold at least one point.
    ZeroCapacity,
    ZeroProbeTimeout,
    ZeroDegradedThreshold,
}

impl fmt::Display for InvalidConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidConfig::IntervalOutOfRange { millis } => write!(
                f,
                "interval {}ms out of range [{}, {}]",
                millis, MIN_INTERVAL_MS, MAX_INTERVAL_MS
            ),
            InvalidConfig::ZeroCapacity => write!(f, "history capacity must be at least 1"),
            InvalidConfig::ZeroProbeTimeout => write!(f, "probe timeout must be positive"),
            InvalidConfig::ZeroDegradedThreshold => {
                write!(f, "degraded threshold must be at least 1")
            }
        }
    }
}

impl std::error::Error for InvalidConfig {}

/// Checks an interval against the allowed range.
pub fn validate_interval(millis: u32) -> Result<u32, InvalidConfig> {
    if (MIN_INTERVAL_MS..=MAX_INTERVAL_MS).contains(&millis) {
        Ok(millis)
    } else {
        Err(InvalidConfig::IntervalOutOfRange { millis })
    }
}

/// Sampler settings.
///
/// Only `interval_ms` can change after start (through the handle's
/// `set_interval`); the rest is fixed for the lifetime of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerConfig {
    pub interval_ms: u32,
    /// Points kept per rolling window.
    pub capacity: usize,
    /// Upper bound on a single probe call.
    pub probe_timeout_ms: u32,
    pub degraded_threshold: u32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            capacity: DEFAULT_CAPACITY,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            degraded_threshold: DEFAULT_DEGRADED_THRESHOLD,
        }
    }
}

impl SamplerConfig {
    /// Default configuration with the given interval.
    pub fn new(interval_ms: u32) -> Result<Self, InvalidConfig> {
        Self::default().with_interval(interval_ms)
    }

    pub fn with_interval(mut self, interval_ms: u32) -> Result<Self, InvalidConfig> {
        self.interval_ms = validate_interval(interval_ms)?;
        Ok(self)
    }

    pub fn with_capacity(mut self, capacity: usize) -> Result<Self, InvalidConfig> {
        if capacity == 0 {
            return Err(InvalidConfig::ZeroCapacity);
        }
        self.capacity = capacity;
        Ok(self)
    }

    pub fn with_probe_timeout(mut self, millis: u32) -> Result<Self, InvalidConfig> {
        if millis == 0 {
            return Err(InvalidConfig::ZeroProbeTimeout);
        }
        self.probe_timeout_ms = millis;
        Ok(self)
    }

    pub fn with_degraded_threshold(mut self, failures: u32) -> Result<Self, InvalidConfig> {
        if failures == 0 {
            return Err(InvalidConfig::ZeroDegradedThreshold);
        }
        self.degraded_threshold = failures;
        Ok(self)
    }

    /// Checks every field. Needed when the struct was built by hand.
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        validate_interval(self.interval_ms)?;
        if self.capacity == 0 {
            return Err(InvalidConfig::ZeroCapacity);
        }
        if self.probe_timeout_ms == 0 {
            return Err(InvalidConfig::ZeroProbeTimeout);
        }
        if self.degraded_threshold == 0 {
            return Err(InvalidConfig::ZeroDegradedThreshold);
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.interval_ms))
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.probe_timeout_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_bounds_are_inclusive() {
        assert_eq!(validate_interval(1_000), Ok(1_000));
        assert_eq!(validate_interval(60_000), Ok(60_000));
        assert_eq!(
            validate_interval(999),
            Err(InvalidConfig::IntervalOutOfRange { millis: 999 })
        );
        assert_eq!(
            validate_interval(60_001),
            Err(InvalidConfig::IntervalOutOfRange { millis: 60_001 })
        );
    }

    #[test]
    fn rejects_sub_second_interval() {
        assert_eq!(
            SamplerConfig::new(500),
            Err(InvalidConfig::IntervalOutOfRange { millis: 500 })
        );
        let cfg = SamplerConfig::new(5_000).unwrap();
        assert_eq!(cfg.interval(), Duration::from_secs(5));
    }

    #[test]
    fn defaults() {
        let cfg = SamplerConfig::default();
        assert_eq!(cfg.interval_ms, 2_000);
        assert_eq!(cfg.capacity, 100);
        assert_eq!(cfg.degraded_threshold, 3);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn builders_reject_zero_values() {
        let cfg = SamplerConfig::default();
        assert_eq!(cfg.with_capacity(0), Err(InvalidConfig::ZeroCapacity));
        assert_eq!(cfg.with_probe_timeout(0), Err(InvalidConfig::ZeroProbeTimeout));
        assert_eq!(
            cfg.with_degraded_threshold(0),
            Err(InvalidConfig::ZeroDegradedThreshold)
        );
    }

    #[test]
    fn validate_catches_hand_built_config() {
        let cfg = SamplerConfig {
            interval_ms: 100,
            ..SamplerConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = SamplerConfig {
            capacity: 0,
            ..SamplerConfig::default()
        };
        assert_eq!(cfg.validate(), Err(InvalidConfig::ZeroCapacity));
    }

    #[test]
    fn error_messages_name_the_range() {
        let msg = InvalidConfig::IntervalOutOfRange { millis: 500 }.to_string();
        assert_eq!(msg, "interval 500ms out of range [1000, 60000]");
    }
}
