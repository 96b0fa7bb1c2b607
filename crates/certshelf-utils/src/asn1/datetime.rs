//! UTCTime and GeneralizedTime values.

use super::{tags, TlvNode};
use certshelf_types::DecodeError;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};

/// Decode a UTCTime or GeneralizedTime element into a UTC timestamp.
pub fn decode_time(node: &TlvNode<'_>) -> Result<OffsetDateTime, DecodeError> {
    let is_time = node.is_universal(tags::UTC_TIME) || node.is_universal(tags::GENERALIZED_TIME);
    if !is_time {
        return Err(DecodeError::unexpected(
            "time",
            format!("expected UTCTime or GeneralizedTime, found {}", node.tag()),
        ));
    }
    let Some(value) = node.primitive_bytes() else {
        return Err(DecodeError::unexpected(
            "time",
            format!("constructed {} is not allowed in DER", node.tag()),
        ));
    };
    if node.number() == tags::UTC_TIME {
        parse_utc_time(value)
    } else {
        parse_generalized_time(value)
    }
}

/// Parse UTCTime content "YYMMDDHHMMSSZ".
/// RFC 5280: 00-49 → 2000-2049, 50-99 → 1950-1999.
pub fn parse_utc_time(value: &[u8]) -> Result<OffsetDateTime, DecodeError> {
    let digits = strip_zulu(value, 12, "UTCTime")?;
    let yy = two_digits(digits, 0)?;
    let year = if yy < 50 { 2000 + yy } else { 1900 + yy };
    assemble(year as i32, &digits[2..])
}

/// Parse GeneralizedTime content "YYYYMMDDHHMMSSZ".
pub fn parse_generalized_time(value: &[u8]) -> Result<OffsetDateTime, DecodeError> {
    let digits = strip_zulu(value, 14, "GeneralizedTime")?;
    let year = two_digits(digits, 0)? * 100 + two_digits(digits, 2)?;
    assemble(year as i32, &digits[4..])
}

/// Check the exact DER shape: `len` ASCII digits followed by 'Z'.
fn strip_zulu<'a>(value: &'a [u8], len: usize, what: &str) -> Result<&'a [u8], DecodeError> {
    if value.len() != len + 1 {
        return Err(DecodeError::invalid_time(format!(
            "{what} must be {} characters, found {}",
            len + 1,
            value.len()
        )));
    }
    let (digits, zone) = value.split_at(len);
    if zone != b"Z" {
        return Err(DecodeError::invalid_time(format!("{what} must end with 'Z'")));
    }
    if !digits.iter().all(u8::is_ascii_digit) {
        return Err(DecodeError::invalid_time(format!(
            "{what} contains a non-digit character"
        )));
    }
    Ok(digits)
}

fn two_digits(digits: &[u8], at: usize) -> Result<u32, DecodeError> {
    match digits.get(at..at + 2) {
        Some([hi, lo]) => Ok(((hi - b'0') * 10 + (lo - b'0')) as u32),
        _ => Err(DecodeError::invalid_time("missing digits")),
    }
}

/// Build a UTC timestamp from "MMDDHHMMSS" digits.
fn assemble(year: i32, rest: &[u8]) -> Result<OffsetDateTime, DecodeError> {
    let month = two_digits(rest, 0)? as u8;
    let day = two_digits(rest, 2)? as u8;
    let hour = two_digits(rest, 4)? as u8;
    let minute = two_digits(rest, 6)? as u8;
    let second = two_digits(rest, 8)? as u8;

    let month = Month::try_from(month)
        .map_err(|_| DecodeError::invalid_time(format!("month {month} out of range")))?;
    let date = Date::from_calendar_date(year, month, day)
        .map_err(|e| DecodeError::invalid_time(format!("invalid date: {e}")))?;
    let time = Time::from_hms(hour, minute, second)
        .map_err(|e| DecodeError::invalid_time(format!("invalid time of day: {e}")))?;
    Ok(PrimitiveDateTime::new(date, time).assume_utc())
}
