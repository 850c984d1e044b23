//! Date normalization.
//!
//! All dates are compared on the wire as UTC strings with millisecond
//! precision and a literal `Z` suffix, e.g. `2024-06-01T10:30:15.250Z`.
//! Inputs in any other offset are converted to UTC before formatting, so
//! two values naming the same instant always produce the same string.

use crate::error::{CodecError, CodecResult};
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Formats a date as `yyyy-MM-ddTHH:mm:ss.SSSZ` in UTC.
///
/// Sub-millisecond precision is truncated.
pub fn format_iso_utc(date: OffsetDateTime) -> CodecResult<String> {
    date.to_offset(UtcOffset::UTC)
        .format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
        ))
        .map_err(|e| CodecError::invalid_date(e.to_string()))
}

/// Parses a string produced by [`format_iso_utc`].
pub fn parse_iso_utc(raw: &str) -> CodecResult<OffsetDateTime> {
    PrimitiveDateTime::parse(
        raw,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"),
    )
    .map(PrimitiveDateTime::assume_utc)
    .map_err(|e| CodecError::invalid_date(format!("{raw}: {e}")))
}

/// Milliseconds since the Unix epoch.
pub fn to_epoch_millis(date: OffsetDateTime) -> i64 {
    (date.unix_timestamp_nanos() / 1_000_000) as i64
}

/// Date for a count of milliseconds since the Unix epoch, in UTC.
pub fn from_epoch_millis(millis: i64) -> CodecResult<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .map_err(|e| CodecError::invalid_date(e.to_string()))
}
