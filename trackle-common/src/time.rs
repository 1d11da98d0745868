//! Timestamp and date-key utilities

use chrono::{DateTime, NaiveDate, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Tomorrow's date in UTC
pub fn tomorrow_utc() -> NaiveDate {
    Utc::now().date_naive() + chrono::Days::new(1)
}

/// Unpadded `Y-M-D` key for a date (`2024-1-10`, not `2024-01-10`)
///
/// Used for blob keys and answer rows; the unpadded form is load-bearing
/// because it doubles as the seed-string prefix.
pub fn date_key(date: NaiveDate) -> String {
    use chrono::Datelike;
    format!("{}-{}-{}", date.year(), date.month(), date.day())
}

/// Format a second count as an `MM:SS` timestamp string
///
/// Fractional seconds are truncated; minutes are not capped at 59.
pub fn format_mm_ss(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}
