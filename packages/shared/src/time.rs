use chrono::{DateTime, SecondsFormat, Utc};

/// Get current Unix timestamp in UTC (milliseconds)
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Get current Unix timestamp in UTC (seconds)
pub fn now_secs() -> i64 {
    Utc::now().timestamp()
}

/// Render a Unix timestamp in milliseconds as RFC 3339 (UTC, millisecond precision).
///
/// Out-of-range values render as the Unix epoch.
pub fn millis_to_rfc3339(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}
