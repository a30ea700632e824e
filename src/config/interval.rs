//! Interval parsing for evenly spaced record timestamps.

use anyhow::Context;
use chrono::TimeDelta;

/// Parse an interval string like "500ms", "30s", "5m", "1h", "1d" or "300".
///
/// Plain numbers are seconds. Intervals must be positive.
pub fn parse_interval(s: &str) -> anyhow::Result<TimeDelta> {
    let s = s.trim();
    if s.is_empty() {
        anyhow::bail!("Empty interval string");
    }

    // "ms" before "s" and "m"
    let (digits, unit_ms) = if let Some(n) = s.strip_suffix("ms") {
        (n, 1)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1_000)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60_000)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, 3_600_000)
    } else if let Some(n) = s.strip_suffix('d') {
        (n, 86_400_000)
    } else {
        (s, 1_000)
    };

    let value: i64 = digits
        .trim()
        .parse()
        .with_context(|| format!("Invalid interval value: {s}"))?;
    if value <= 0 {
        anyhow::bail!("Interval must be positive: {s}");
    }
    let millis = value
        .checked_mul(unit_ms)
        .with_context(|| format!("Interval too large: {s}"))?;
    TimeDelta::try_milliseconds(millis).with_context(|| format!("Interval too large: {s}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_interval_units() {
        assert_eq!(parse_interval("500ms").unwrap(), TimeDelta::milliseconds(500));
        assert_eq!(parse_interval("30s").unwrap(), TimeDelta::seconds(30));
        assert_eq!(parse_interval("5m").unwrap(), TimeDelta::minutes(5));
        assert_eq!(parse_interval("1h").unwrap(), TimeDelta::hours(1));
        assert_eq!(parse_interval("1d").unwrap(), TimeDelta::days(1));
        assert_eq!(parse_interval(" 300 ").unwrap(), TimeDelta::seconds(300));
    }

    #[test]
    fn test_parse_interval_rejects_bad_input() {
        assert!(parse_interval("").is_err());
        assert!(parse_interval("abc").is_err());
        assert!(parse_interval("5x").is_err());
        assert!(parse_interval("0s").is_err());
        assert!(parse_interval("-5m").is_err());
    }
}
