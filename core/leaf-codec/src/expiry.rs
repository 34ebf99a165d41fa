//! Expiry arithmetic shared by both code families.
//!
//! Instants are UTC with second resolution. The textual form used inside
//! cipher payloads is the fixed pattern `yyyy-MM-dd HH:mm:ss`.

use chrono::{DateTime, Duration, NaiveDateTime, SubsecRound, Utc};

use crate::error::{CodecError, CodecResult};

/// Seconds in one day.
pub const SECS_PER_DAY: i64 = 24 * 60 * 60;

/// `strftime` form of `yyyy-MM-dd HH:mm:ss`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Whole days since the Unix epoch (floor division).
#[must_use]
pub fn day_count(instant: &DateTime<Utc>) -> i64 {
    instant.timestamp().div_euclid(SECS_PER_DAY)
}

/// First instant of the given epoch day.
///
/// # Errors
///
/// Returns [`CodecError::RangeOverflow`] if the day is outside chrono's range.
pub fn day_start(days: i64) -> CodecResult<DateTime<Utc>> {
    days.checked_mul(SECS_PER_DAY)
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .ok_or(CodecError::RangeOverflow { days })
}

/// `reference + days`, truncated to whole seconds.
///
/// # Errors
///
/// Returns [`CodecError::RangeOverflow`] if the result is not representable.
pub fn days_from(reference: &DateTime<Utc>, days: i64) -> CodecResult<DateTime<Utc>> {
    Duration::try_days(days)
        .and_then(|d| reference.checked_add_signed(d))
        .map(|t| t.trunc_subsecs(0))
        .ok_or(CodecError::RangeOverflow { days })
}

/// `now + days`, truncated to whole seconds.
///
/// # Errors
///
/// Returns [`CodecError::RangeOverflow`] if the result is not representable.
pub fn days_from_now(days: i64) -> CodecResult<DateTime<Utc>> {
    days_from(&Utc::now(), days)
}

/// Renders an instant as `yyyy-MM-dd HH:mm:ss`.
#[must_use]
pub fn format_timestamp(instant: &DateTime<Utc>) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a `yyyy-MM-dd HH:mm:ss` string as a UTC instant.
///
/// The match is strict: the input must be exactly what
/// [`format_timestamp`] would produce for the parsed value, so unpadded
/// fields, trailing text and other separators are all rejected.
///
/// # Errors
///
/// Returns [`CodecError::Format`] on any pattern mismatch.
pub fn parse_timestamp(s: &str) -> CodecResult<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map_err(|e| CodecError::Format(format!("{s:?}: {e}")))?;
    let instant = naive.and_utc();
    if format_timestamp(&instant) != s {
        return Err(CodecError::Format(format!(
            "{s:?} is not in yyyy-MM-dd HH:mm:ss form"
        )));
    }
    Ok(instant)
}
