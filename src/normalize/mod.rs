//! Projection of raw exported payloads into the canonical V2/V4 shapes.

pub mod v2;
pub mod v4;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};

pub use v2::normalize_v2;
pub use v4::{normalize_v4, parse_archive};

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field} '{value}'"))
}

/// Day keys are `YYYY-MM-DD`, optionally followed by a time part.
pub fn parse_day(value: &str) -> Result<NaiveDate> {
    let date_part = value.split('T').next().unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .with_context(|| format!("failed to parse day key '{value}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_keys_accept_optional_time() {
        let expected = NaiveDate::from_ymd_opt(2023, 1, 5).unwrap();
        assert_eq!(parse_day("2023-01-05").unwrap(), expected);
        assert_eq!(parse_day("2023-01-05T00:00:00Z").unwrap(), expected);
        assert!(parse_day("yesterday").is_err());
    }

    #[test]
    fn datetimes_are_converted_to_utc() {
        let parsed = parse_datetime("2023-01-05T10:00:00+02:00", "creationDate").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2023-01-05T08:00:00+00:00");
        assert!(parse_datetime("not a date", "creationDate").is_err());
    }
}
