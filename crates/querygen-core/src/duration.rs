//! Duration display in the `1h0m0s` form used by benchmark labels.
//!
//! Human labels are compared across backends and against results produced
//! by other tooling, so durations always render as hours, minutes and seconds
//! with every lower unit spelled out (`48h0m0s`, `30m0s`, `1m30s`, `45s`).

use std::fmt;
use std::time::Duration;

/// Wrapper that renders a [`Duration`] as `XhYmZs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoDuration(pub Duration);

impl fmt::Display for GoDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.0;
        if d.is_zero() {
            return write!(f, "0s");
        }

        let nanos = d.subsec_nanos();
        if d.as_secs() == 0 {
            return if nanos % 1_000_000 == 0 {
                write!(f, "{}ms", nanos / 1_000_000)
            } else if nanos % 1_000 == 0 {
                write!(f, "{}µs", nanos / 1_000)
            } else {
                write!(f, "{nanos}ns")
            };
        }

        let total = d.as_secs();
        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let seconds = total % 60;

        if hours > 0 {
            write!(f, "{hours}h{minutes}m")?;
        } else if minutes > 0 {
            write!(f, "{minutes}m")?;
        }

        if nanos == 0 {
            write!(f, "{seconds}s")
        } else {
            let frac = format!("{nanos:09}");
            write!(f, "{seconds}.{}s", frac.trim_end_matches('0'))
        }
    }
}

/// Render `duration` as `XhYmZs`.
pub fn format_duration(duration: Duration) -> String {
    GoDuration(duration).to_string()
}

/// Duration expressed in fractional hours, as printed by top-K labels.
pub fn hours(duration: Duration) -> f64 {
    duration.as_secs_f64() / 3600.0
}
