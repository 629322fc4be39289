//! Duration flags such as `200ms`, `1s`, `15m` or `1h`.

use std::time::Duration;
use wintrack_core::clock::to_chrono;
use wintrack_core::config::{MAX_POLL_INTERVAL, MAX_SUBMISSION_INTERVAL};
use wintrack_core::report::format_duration;

/// Parse a duration flag. A bare number is taken as milliseconds.
///
/// # Errors
///
/// Returns an error if the value has no number or an unknown unit
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    let parsed = if let Some(ms) = value.strip_suffix("ms") {
        ms.parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(s) = value.strip_suffix('s') {
        s.parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(m) = value.strip_suffix('m') {
        m.parse::<u64>()
            .ok()
            .and_then(|v| v.checked_mul(60))
            .map(Duration::from_secs)
    } else if let Some(h) = value.strip_suffix('h') {
        h.parse::<u64>()
            .ok()
            .and_then(|v| v.checked_mul(3600))
            .map(Duration::from_secs)
    } else {
        value.parse::<u64>().ok().map(Duration::from_millis)
    };

    parsed.ok_or_else(|| format!("invalid duration '{value}' (try 200ms, 1s, 15m or 1h)"))
}

fn parse_bounded(value: &str, max: Duration) -> Result<Duration, String> {
    let duration = parse_duration(value)?;
    if duration > max {
        return Err(format!(
            "duration '{}' is longer than {}",
            value.trim(),
            format_interval(max)
        ));
    }
    Ok(duration)
}

/// `--interval`: at most one day
///
/// # Errors
///
/// Returns an error if the value does not parse or is too long
pub fn parse_poll_interval(value: &str) -> Result<Duration, String> {
    parse_bounded(value, MAX_POLL_INTERVAL)
}

/// `--submission-interval`: at most one week
///
/// # Errors
///
/// Returns an error if the value does not parse or is too long
pub fn parse_submission_interval(value: &str) -> Result<Duration, String> {
    parse_bounded(value, MAX_SUBMISSION_INTERVAL)
}

/// Render an interval for status lines: `200ms` below a second, `1m30s` above
#[must_use]
pub fn format_interval(interval: Duration) -> String {
    if interval < Duration::from_secs(1) {
        format!("{}ms", interval.as_millis())
    } else {
        format_duration(to_chrono(interval))
    }
}
