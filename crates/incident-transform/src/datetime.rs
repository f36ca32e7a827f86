//! Tolerant date parsing.
//!
//! Accepted inputs, tried in order:
//!
//! - RFC 3339 / ISO 8601 date-times with an offset (`2024-10-03T14:30:00+02:00`)
//! - ISO 8601 date-times without an offset, read as UTC (`2024-10-03T14:30`)
//! - ISO dates with `-` or `/` separators (`2024-10-03`, `2024/10/03`)
//! - day-first dates (`03/10/2024`, `03-10-24 14:30:05`); two-digit years are 20yy
//!
//! Everything is normalized to UTC.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use regex::Regex;

static DAY_FIRST_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})[/\-](\d{1,2})[/\-](\d{2,4})(?:\s+(\d{1,2}):(\d{2})(?::(\d{2}))?)?$")
        .expect("Invalid day-first date regex")
});

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parses a date or date-time, returning `None` when no accepted form matches.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if starts_with_year(raw)
        && let Some(parsed) = parse_year_first(raw)
    {
        return Some(parsed);
    }
    parse_day_first(raw)
}

// Year-first formats only apply to a leading 4-digit year; chrono would
// otherwise read `03/10/24` as the year 3.
fn starts_with_year(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() >= 5 && bytes[..4].iter().all(u8::is_ascii_digit) && !bytes[4].is_ascii_digit()
}

fn parse_year_first(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(raw, format) {
            return Some(parsed.with_timezone(&Utc));
        }
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0).map(|midnight| midnight.and_utc());
        }
    }
    None
}

fn parse_day_first(raw: &str) -> Option<DateTime<Utc>> {
    let caps = DAY_FIRST_REGEX.captures(raw)?;
    let number = |idx: usize| -> Option<u32> {
        caps.get(idx)
            .map_or(Some(0), |m| m.as_str().parse::<u32>().ok())
    };
    let day = number(1)?;
    let month = number(2)?;
    let mut year = i32::try_from(number(3)?).ok()?;
    if year < 100 {
        year += 2000;
    }
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_opt(number(4)?, number(5)?, number(6)?)?;
    Some(NaiveDateTime::new(date, time).and_utc())
}
