//! Error types shared by every querygen crate.

use std::time::Duration;

/// Errors raised while building or dispatching benchmark queries.
///
/// None of these are retryable: each one describes a configuration defect
/// that is discoverable before a single query reaches a database.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryGenError {
    /// A sampling or metric-subset request fell outside `[1, total]`.
    #[error("requested {count} {kind} name(s), but the valid range is 1..={total} (see --scale)")]
    Bounds {
        kind: &'static str,
        count: usize,
        total: usize,
    },

    /// The requested window does not fit inside the benchmark time range.
    #[error("window of {duration:?} does not fit in the benchmark time range of {range:?}")]
    WindowTooLarge { duration: Duration, range: Duration },

    /// The benchmark time range ends before it starts.
    #[error("time range end {end} is before start {start}")]
    InvalidTimeRange { start: String, end: String },

    /// The backend does not implement the capability a scenario needs.
    #[error("scenario '{scenario}' is not supported by backend '{backend}'")]
    UnsupportedScenario {
        scenario: &'static str,
        backend: String,
    },
}
