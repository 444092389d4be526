//! Date/time utilities for tubesync.
//!
//! Timestamps are stored as RFC3339 text with millisecond precision and a `Z`
//! suffix so that SQL string comparison and `MAX()` order them chronologically.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;

/// Stored value for "imported but never synced" channels.
pub const NEVER_SYNCED: &str = "1970-01-01T00:00:00.000Z";

/// The never-synced sentinel as a timestamp.
pub fn never_synced() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

/// Format a timestamp for storage.
pub fn to_db(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp.
///
/// Accepts RFC3339 and the SQLite `datetime('now')` format.
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

/// Start of the calendar day containing `now`, as seen in `tz`.
///
/// A midnight skipped by a DST transition resolves to the first valid instant
/// after it.
pub fn start_of_day(now: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
    let midnight = now.with_timezone(tz).date_naive().and_time(chrono::NaiveTime::MIN);

    let local = match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest(),
    };

    local
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}
