//! Error types for the polling-and-dispatch loop.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use devwatch_core::{CacheError, NotifyError, StoreError};

/// Startup configuration failure. Always fatal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Failed to read thresholds file {}: {source}", path.display())]
    ThresholdsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse thresholds file {}: {source}", path.display())]
    ThresholdsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A failed fetch. The cursor stays where it was and the next tick retries.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Metric fetch timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

/// The three side-effect targets of a raised alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sink {
    Cache,
    Record,
    Notify,
}

impl fmt::Display for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cache => "alert cache",
            Self::Record => "alert record",
            Self::Notify => "notification",
        };
        f.write_str(name)
    }
}

/// A failed sink call. Logged by the dispatcher; never propagated further.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error("{sink} timed out after {}ms", .after.as_millis())]
    Timeout { sink: Sink, after: Duration },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
