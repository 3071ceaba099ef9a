//! Half-open time intervals and random window selection.

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::QueryGenError;

/// A half-open time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeInterval {
    /// Create an interval. `end` must not precede `start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, QueryGenError> {
        if end < start {
            return Err(QueryGenError::InvalidTimeRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        (self.end - self.start).to_std().unwrap_or(Duration::ZERO)
    }

    /// RFC 3339 rendering of the start, used in human descriptions.
    pub fn start_string(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn end_string(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// Check that a window of `window` fits inside this interval.
    pub fn check_window(&self, window: Duration) -> Result<(), QueryGenError> {
        let range = self.duration();
        if window.is_zero() || window > range {
            return Err(QueryGenError::WindowTooLarge {
                duration: window,
                range,
            });
        }
        Ok(())
    }

    /// Pick a uniformly random sub-interval `[s, s + window)` fully contained
    /// in this interval. Start times are whole seconds.
    pub fn rand_window<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        window: Duration,
    ) -> Result<TimeInterval, QueryGenError> {
        self.check_window(window)?;

        let delta = TimeDelta::from_std(window).map_err(|_| QueryGenError::WindowTooLarge {
            duration: window,
            range: self.duration(),
        })?;

        let lower = self.start.timestamp();
        let upper = (self.end - delta).timestamp();
        // A sub-second range can put `upper` before `lower` after truncation.
        let offset = if upper > lower {
            rng.random_range(0..=upper - lower)
        } else {
            0
        };

        let start = self.start + TimeDelta::seconds(offset);
        Ok(TimeInterval {
            start,
            end: start + delta,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn global() -> TimeInterval {
        TimeInterval::new(
            Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2016, 1, 4, 0, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_rand_window_is_contained_and_exact() {
        let mut rng = StdRng::seed_from_u64(42);
        let range = global();

        for hours in [1, 12, 48, 72] {
            let window = Duration::from_secs(hours * 3600);
            for _ in 0..200 {
                let w = range.rand_window(&mut rng, window).unwrap();
                assert_eq!(w.duration(), window);
                assert!(w.start() >= range.start());
                assert!(w.end() <= range.end());
            }
        }
    }

    #[test]
    fn test_rand_window_full_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let range = global();
        let w = range.rand_window(&mut rng, range.duration()).unwrap();
        assert_eq!(w, range);
    }

    #[test]
    fn test_rand_window_too_large() {
        let mut rng = StdRng::seed_from_u64(1);
        let range = global();
        let err = range
            .rand_window(&mut rng, Duration::from_secs(4 * 24 * 3600))
            .unwrap_err();
        assert!(matches!(err, QueryGenError::WindowTooLarge { .. }));
        assert!(range.rand_window(&mut rng, Duration::ZERO).is_err());
    }

    #[test]
    fn test_start_string_is_rfc3339() {
        assert_eq!(global().start_string(), "2016-01-01T00:00:00Z");
        assert_eq!(global().end_string(), "2016-01-04T00:00:00Z");
    }

    #[test]
    fn test_new_rejects_reversed_range() {
        let r = global();
        assert!(matches!(
            TimeInterval::new(r.end(), r.start()),
            Err(QueryGenError::InvalidTimeRange { .. })
        ));
    }
}
