//! The probe seam: where host readings enter the sampler.

use std::fmt;
use std::time::Duration;

use crate::storage::HostSample;

/// Error produced when a probe cannot deliver a sample.
///
/// Every variant is transient from the sampler's point of view: the tick is
/// skipped and sampling continues on schedule.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeError {
    /// A source file could not be read.
    Read { path: String, message: String },
    /// A source file had unexpected content.
    Parse(String),
    /// The probe call did not finish within the configured timeout.
    Timeout(Duration),
    /// A previous, timed-out probe call is still running.
    Busy,
    /// The probe call panicked.
    Panicked(String),
}

impl ProbeError {
    pub fn read(path: impl Into<String>, err: impl fmt::Display) -> Self {
        ProbeError::Read {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Human-readable cause, suitable for a status line.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Read { path, message } => write!(f, "cannot read {}: {}", path, message),
            ProbeError::Parse(msg) => write!(f, "parse error: {}", msg),
            ProbeError::Timeout(d) => write!(f, "probe timed out after {}ms", d.as_millis()),
            ProbeError::Busy => write!(f, "previous probe call still running"),
            ProbeError::Panicked(msg) => write!(f, "probe panicked: {}", msg),
        }
    }
}

impl std::error::Error for ProbeError {}

/// Source of host samples.
///
/// Implementations may block (CPU sampling typically averages over a short
/// window); the sampler loop always calls them off the async runtime.
pub trait Probe: Send + 'static {
    /// Takes one consistent reading of the host.
    fn sample(&mut self) -> Result<HostSample, ProbeError>;
}

impl<P: Probe + ?Sized> Probe for Box<P> {
    fn sample(&mut self) -> Result<HostSample, ProbeError> {
        (**self).sample()
    }
}
