//! Wire-level parameter parsing.
//!
//! Turns the raw strings of a form body or query string into typed values.
//! Every failure is a [`EventError::Validation`] naming the offending parameter.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::error::{EventError, EventResult};
use crate::models::{EventId, UserId, YearMonth};

pub fn parse_user_id(value: &str) -> EventResult<UserId> {
    parse_positive("user_id", value)
}

pub fn parse_event_id(value: &str) -> EventResult<EventId> {
    parse_positive("id", value)
}

fn parse_positive(name: &str, value: &str) -> EventResult<i64> {
    if value.is_empty() {
        return Err(required(name));
    }

    let parsed: i64 = value
        .parse()
        .map_err(|_| EventError::validation(format!("invalid {name}")))?;

    if parsed <= 0 {
        return Err(EventError::validation(format!(
            "{name} must be a positive number"
        )));
    }

    Ok(parsed)
}

/// Parses `YYYY-MM-DD` into midnight UTC of that day.
pub fn parse_date(value: &str) -> EventResult<DateTime<Utc>> {
    if value.is_empty() {
        return Err(required("date"));
    }

    let invalid = || EventError::validation("invalid date format, use YYYY-MM-DD");

    if !matches_shape(value, "NNNN-NN-NN") {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|day| day.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| invalid())
}

/// Parses `YYYY-MM`.
pub fn parse_year_month(value: &str) -> EventResult<YearMonth> {
    if value.is_empty() {
        return Err(required("date"));
    }

    let invalid = || EventError::validation("invalid date format, use YYYY-MM");

    if !matches_shape(value, "NNNN-NN") {
        return Err(invalid());
    }
    let (year, month) = value.split_once('-').ok_or_else(invalid)?;

    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;

    YearMonth::new(year, month).ok_or_else(invalid)
}

/// `N` in `shape` stands for one ASCII digit; every other byte must match exactly.
fn matches_shape(value: &str, shape: &str) -> bool {
    value.len() == shape.len()
        && value.bytes().zip(shape.bytes()).all(|(v, s)| match s {
            b'N' => v.is_ascii_digit(),
            _ => v == s,
        })
}

fn required(name: &str) -> EventError {
    EventError::validation(format!("parameter {name} is required"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_user_id() {
        assert_eq!(parse_user_id("42").unwrap(), 42);
        assert_eq!(
            parse_user_id("").unwrap_err().message(),
            "parameter user_id is required"
        );
        assert_eq!(parse_user_id("abc").unwrap_err().message(), "invalid user_id");
        assert_eq!(
            parse_user_id("0").unwrap_err().message(),
            "user_id must be a positive number"
        );
        assert_eq!(
            parse_user_id("-3").unwrap_err().message(),
            "user_id must be a positive number"
        );
    }

    #[test]
    fn test_parse_event_id_rejects_overflow() {
        assert_eq!(
            parse_event_id("99999999999999999999").unwrap_err().message(),
            "invalid id"
        );
        assert_eq!(parse_event_id("7").unwrap(), 7);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2023-12-31").unwrap(),
            Utc.with_ymd_and_hms(2023, 12, 31, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_date("31.12.2023").unwrap_err().message(),
            "invalid date format, use YYYY-MM-DD"
        );
        assert!(parse_date("2023-02-30").is_err());
        for bad in [
            "2023-1-5",
            "+2023-01-05",
            "2023-01-5",
            "02023-01-05",
            "2023/01/05",
            "2023-01-05 ",
        ] {
            assert_eq!(
                parse_date(bad).unwrap_err().message(),
                "invalid date format, use YYYY-MM-DD",
                "{bad}"
            );
        }
        assert_eq!(
            parse_date("").unwrap_err().message(),
            "parameter date is required"
        );
    }

    #[test]
    fn test_parse_year_month() {
        let ym = parse_year_month("2023-12").unwrap();
        assert_eq!((ym.year(), ym.month()), (2023, 12));

        for bad in [
            "2023-13", "2023-1", "2023", "2023-12-01", "23-12", "abcd-ef", "+123-12", "2023-+1",
            "-023-12", "2023_12",
        ] {
            assert_eq!(
                parse_year_month(bad).unwrap_err().message(),
                "invalid date format, use YYYY-MM",
                "{bad}"
            );
        }
    }
}
