//! Field encodings shared by the wire schemas.

use chrono::{Datelike, NaiveDate};

use crate::error::{ErrorCode, QbError, QbResult};

/// Years representable in the four-digit `YYYY` field.
const ENCODABLE_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// Encode a date as the integer `YYYYMMDD`.
///
/// Fails for years outside `0..=9999`.
pub fn encode_date(date: NaiveDate) -> QbResult<u32> {
    let year = date.year();
    if !ENCODABLE_YEARS.contains(&year) {
        return Err(QbError::parse(
            ErrorCode::ParseInvalidDate,
            format!("date {} cannot be encoded as YYYYMMDD", date),
        ));
    }
    Ok(year as u32 * 10_000 + date.month() * 100 + date.day())
}

/// Decode an integer `YYYYMMDD` date.
pub fn decode_date(value: u32) -> QbResult<NaiveDate> {
    let year = (value / 10_000) as i32;
    let month = (value / 100) % 100;
    let day = value % 100;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        QbError::parse(
            ErrorCode::ParseInvalidDate,
            format!("invalid YYYYMMDD date: {}", value),
        )
    })
}

/// Parse a `"YYYY-MM-DD"` date.
pub fn parse_iso_date(value: &str) -> QbResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        QbError::parse(
            ErrorCode::ParseInvalidDate,
            format!("invalid YYYY-MM-DD date '{}': {}", value, e),
        )
    })
}

/// Format a date as `"YYYY-MM-DD"`.
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a hex-like question or set token such as `"114C05"`.
pub fn encode_hex_id(token: &str) -> QbResult<u64> {
    let trimmed = token.trim();
    u64::from_str_radix(trimmed, 16).map_err(|e| {
        QbError::parse(
            ErrorCode::ParseInvalidId,
            format!("identifier '{}' is not hexadecimal: {}", token, e),
        )
    })
}

/// Render a stored token as upper-case hex.
///
/// Leading zeros of the input token are not preserved.
pub fn decode_hex_id(value: u64) -> String {
    format!("{:X}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_encoding() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 7).unwrap();
        assert_eq!(encode_date(date).unwrap(), 20241207);
        assert_eq!(decode_date(20241207).unwrap(), date);
    }

    #[test]
    fn test_invalid_encoded_date() {
        assert!(decode_date(20241332).is_err());
        assert!(decode_date(0).is_err());
    }

    #[test]
    fn test_year_outside_wire_range() {
        let before_epoch = NaiveDate::from_ymd_opt(-1, 6, 1).unwrap();
        let err = encode_date(before_epoch).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ParseInvalidDate);

        let far_future = NaiveDate::from_ymd_opt(10_000, 1, 1).unwrap();
        assert!(encode_date(far_future).is_err());

        let last = NaiveDate::from_ymd_opt(9999, 12, 31).unwrap();
        assert_eq!(encode_date(last).unwrap(), 99991231);
    }

    #[test]
    fn test_iso_dates() {
        let date = parse_iso_date("2024-12-15").unwrap();
        assert_eq!(encode_date(date).unwrap(), 20241215);
        assert_eq!(format_iso_date(date), "2024-12-15");
        assert!(parse_iso_date("2024/12/15").is_err());
    }

    #[test]
    fn test_hex_ids() {
        assert_eq!(encode_hex_id("114C05").unwrap(), 0x114c05);
        assert_eq!(encode_hex_id("114c05").unwrap(), 0x114c05);
        assert_eq!(decode_hex_id(0x114c05), "114C05");
        assert!(encode_hex_id("Q-1").is_err());
        assert!(encode_hex_id("").is_err());
    }

    #[test]
    fn test_leading_zeros_are_dropped() {
        let stored = encode_hex_id("0A1").unwrap();
        assert_eq!(decode_hex_id(stored), "A1");
    }
}
