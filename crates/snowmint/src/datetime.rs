//! Conversions between Unix epoch milliseconds and `chrono` date-times.
//!
//! Timestamps extracted from IDs are plain epoch milliseconds; these helpers
//! render them for humans and parse them back. Milliseconds are signed in
//! both directions so instants before 1970 round-trip. Conversions to a
//! date-time return `None` for milliseconds outside `chrono`'s representable
//! range instead of panicking.

use chrono::{
    DateTime, FixedOffset, Local, LocalResult, NaiveDateTime, SecondsFormat, TimeZone, Utc,
};

use crate::error::{Error, Result};

/// Returns the current time in Unix epoch milliseconds.
pub fn current_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Returns the current date-time in the host's local time zone.
pub fn now_local() -> DateTime<Local> {
    Local::now()
}

/// Returns the host's current UTC offset.
pub fn local_offset() -> FixedOffset {
    *now_local().offset()
}

/// Converts epoch milliseconds to a UTC date-time.
pub fn to_utc(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

/// Converts epoch milliseconds to a date-time in the host's local time zone.
pub fn to_local(millis: i64) -> Option<DateTime<Local>> {
    to_utc(millis).map(|dt| dt.with_timezone(&Local))
}

/// Converts epoch milliseconds to a date-time at a fixed UTC offset.
pub fn to_fixed_offset(millis: i64, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    to_utc(millis).map(|dt| dt.with_timezone(&offset))
}

/// Converts epoch milliseconds to a naive wall-clock date-time in the host's
/// local time zone.
pub fn to_naive_local(millis: i64) -> Option<NaiveDateTime> {
    to_local(millis).map(|dt| dt.naive_local())
}

/// Formats epoch milliseconds as RFC 3339 / ISO-8601 in UTC, with millisecond
/// precision and a `Z` suffix, e.g. `2025-01-01T00:00:00.000Z`.
pub fn to_iso_string(millis: i64) -> Option<String> {
    to_utc(millis).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Converts a date-time in any time zone to epoch milliseconds.
pub fn from_datetime<Tz: TimeZone>(datetime: &DateTime<Tz>) -> i64 {
    datetime.timestamp_millis()
}

/// Interprets a naive date-time in the host's local time zone and converts it
/// to epoch milliseconds.
///
/// Ambiguous local times (DST fall-back) resolve to the earlier instant;
/// non-existent ones (DST spring-forward gap) yield `None`.
pub fn from_naive_local(datetime: &NaiveDateTime) -> Option<i64> {
    match Local.from_local_datetime(datetime) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.timestamp_millis()),
        LocalResult::None => None,
    }
}

/// Parses an RFC 3339 / ISO-8601 string with an explicit offset and converts
/// it to epoch milliseconds.
///
/// # Errors
///
/// Returns [`Error::InvalidDateTime`] if `input` is not a valid RFC 3339
/// date-time.
pub fn from_iso_string(input: &str) -> Result<i64> {
    DateTime::parse_from_rfc3339(input.trim())
        .map(|dt| dt.timestamp_millis())
        .map_err(|e| Error::InvalidDateTime {
            input: input.to_owned(),
            reason: e.to_string(),
        })
}
