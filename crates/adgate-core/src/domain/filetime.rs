//! AD FILETIME and generalized-time codecs
//!
//! Active Directory stores several timestamps (`pwdLastSet`, `lastLogon`,
//! `lastLogonTimestamp`) as a 64-bit count of 100-nanosecond intervals since
//! 1601-01-01T00:00:00Z. A raw value of zero means "unset" and is distinct
//! from a value that fails to convert: callers must check for zero before
//! decoding and treat it as absent, never as the 1601 epoch.
//!
//! Search filters against `whenChanged` use the generalized-time text form
//! `YYYYMMDDHHMMSS.0Z`, which sorts correctly as a plain string because it
//! is fixed-width and zero-padded.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// The FILETIME epoch: 1601-01-01T00:00:00Z.
fn epoch() -> DateTime<Utc> {
    let date = NaiveDate::from_ymd_opt(1601, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    Utc.from_utc_datetime(&date)
}

/// Decodes a FILETIME value into a UTC timestamp.
///
/// Returns `None` for zero ("unset"), negative values, and values whose
/// conversion overflows. Decode failures are soft: the caller logs a
/// warning and carries on with an absent timestamp.
pub fn decode(intervals: i64) -> Option<DateTime<Utc>> {
    if intervals <= 0 {
        return None;
    }
    let micros = intervals / 10;
    epoch().checked_add_signed(chrono::Duration::microseconds(micros))
}

/// Encodes a UTC timestamp back into a FILETIME value.
///
/// The inverse of [`decode`] up to microsecond rounding (the 100-ns digit
/// is lost on decode). Returns `None` for timestamps before the 1601 epoch.
pub fn encode(ts: DateTime<Utc>) -> Option<i64> {
    let micros = ts.signed_duration_since(epoch()).num_microseconds()?;
    if micros < 0 {
        return None;
    }
    micros.checked_mul(10)
}

/// Formats a timestamp in the directory's generalized-time form.
pub fn to_generalized_time(ts: DateTime<Utc>) -> String {
    ts.format("%Y%m%d%H%M%S.0Z").to_string()
}

/// Parses a generalized-time string (`whenCreated` / `whenChanged`).
///
/// Only the 14 leading digits matter; fractional seconds and the zone
/// designator are ignored because the directory always emits `.0Z`.
pub fn parse_generalized_time(value: &str) -> Option<DateTime<Utc>> {
    let digits = value.get(..14)?;
    let naive = chrono::NaiveDateTime::parse_from_str(digits, "%Y%m%d%H%M%S").ok()?;
    Some(Utc.from_utc_datetime(&naive))
}
