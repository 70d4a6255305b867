// src/utils/time.rs

use chrono::{DateTime, Utc};

/// Gets the current timestamp in seconds since Unix epoch.
pub fn get_current_timestamp() -> u64 {
    Utc::now().timestamp() as u64
}

/// Gets the current timestamp in milliseconds since Unix epoch.
pub fn get_current_timestamp_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

/// Renders a millisecond Unix timestamp as RFC 3339, empty string when the
/// value is out of chrono's representable range.
pub fn millis_to_rfc3339(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}
