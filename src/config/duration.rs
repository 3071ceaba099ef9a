//! Duration parsing utilities.

use anyhow::Context;
use std::time::Duration;

/// Parse a duration string like "7d", "1h", "30m", "300s", "300" into seconds.
/// Supports:
/// - Plain numbers (interpreted as seconds): "300"
/// - Seconds suffix: "300s"
/// - Minutes suffix: "30m"
/// - Hours suffix: "1h"
/// - Days suffix: "7d"
pub fn parse_duration_to_secs(s: &str) -> anyhow::Result<i64> {
    let s = s.trim();
    if s.is_empty() {
        anyhow::bail!("Empty duration string");
    }

    // Check for suffix
    if let Some(num_str) = s.strip_suffix('d') {
        let days: i64 = num_str
            .parse()
            .with_context(|| format!("Invalid days value: {num_str}"))?;
        return days
            .checked_mul(86_400)
            .with_context(|| format!("Duration too large: {s}"));
    }
    if let Some(num_str) = s.strip_suffix('h') {
        let hours: i64 = num_str
            .parse()
            .with_context(|| format!("Invalid hours value: {num_str}"))?;
        return hours
            .checked_mul(3600)
            .with_context(|| format!("Duration too large: {s}"));
    }
    if let Some(num_str) = s.strip_suffix('m') {
        let minutes: i64 = num_str
            .parse()
            .with_context(|| format!("Invalid minutes value: {num_str}"))?;
        return minutes
            .checked_mul(60)
            .with_context(|| format!("Duration too large: {s}"));
    }
    if let Some(num_str) = s.strip_suffix('s') {
        let secs: i64 = num_str
            .parse()
            .with_context(|| format!("Invalid seconds value: {num_str}"))?;
        return Ok(secs);
    }

    // No suffix - treat as seconds
    s.parse::<i64>()
        .with_context(|| format!("Invalid duration value: {s}"))
}

/// Like [`parse_duration_to_secs`], rejecting zero and negative values.
pub fn parse_duration(s: &str) -> anyhow::Result<Duration> {
    let secs = parse_duration_to_secs(s)?;
    if secs <= 0 {
        anyhow::bail!("Duration must be positive: {s}");
    }
    Ok(Duration::from_secs(secs as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_suffixes() {
        assert_eq!(parse_duration_to_secs("300").unwrap(), 300);
        assert_eq!(parse_duration_to_secs("300s").unwrap(), 300);
        assert_eq!(parse_duration_to_secs("30m").unwrap(), 1800);
        assert_eq!(parse_duration_to_secs("1h").unwrap(), 3600);
        assert_eq!(parse_duration_to_secs(" 7d ").unwrap(), 604_800);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_duration_to_secs("").is_err());
        assert!(parse_duration_to_secs("h").is_err());
        assert!(parse_duration_to_secs("1w").is_err());
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("-5m").is_err());
    }

    #[test]
    fn test_parse_overflow_is_an_error() {
        let err = parse_duration_to_secs("200000000000000d").unwrap_err();
        assert!(err.to_string().contains("Duration too large"), "{err}");
        assert!(parse_duration_to_secs("9223372036854775807h").is_err());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("2d").unwrap(), Duration::from_secs(172_800));
    }
}
