//! Timestamp helpers.
//!
//! All timestamps in the workspace are integer seconds since the Unix epoch,
//! interpreted as UTC. Dates supplied by users (window bounds, truncation
//! dates) are converted here.

use crate::TypeError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Seconds in one hour.
pub const SECONDS_PER_HOUR: i64 = 3600;

/// Rendering format for human-readable datetimes.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a date or datetime string into a Unix timestamp (seconds, UTC).
///
/// Accepted formats:
/// - `YYYY-MM-DD` (midnight UTC)
/// - `YYYY-MM-DD HH:MM:SS`
/// - `YYYY-MM-DDTHH:MM:SS`
/// - RFC 3339 (`2025-01-01T00:00:00Z`, `2025-01-01T02:00:00+02:00`)
///
/// # Example
///
/// ```rust
/// use lp_types::parse_date_ts;
///
/// assert_eq!(parse_date_ts("2024-01-01").unwrap(), 1704067200);
/// assert_eq!(parse_date_ts("2024-01-01 01:00:00").unwrap(), 1704070800);
/// ```
pub fn parse_date_ts(s: &str) -> Result<i64, TypeError> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.timestamp());
    }

    for format in [DATETIME_FORMAT, "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt.and_utc().timestamp());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
        .ok_or_else(|| TypeError::InvalidDate(s.to_string()))
}
