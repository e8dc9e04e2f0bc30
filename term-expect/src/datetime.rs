//! Date and time parsing for string columns.

use crate::core::Value;
use crate::prelude::*;
use chrono::format::{self, Item, ParseErrorKind, Parsed, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%d %B %Y %H:%M:%S",
    "%B %d, %Y %H:%M:%S",
    "%b %d, %Y %H:%M:%S",
    "%Y%m%dT%H%M%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%Y%m%d",
];

/// Parses a date or date-time string in any of the common layouts.
///
/// Accepts RFC 3339 and RFC 2822 timestamps (converted to UTC), ISO-like
/// date-times, US-style dates and month names. A bare date parses as
/// midnight.
///
/// ```rust
/// use term_expect::datetime::parse_datetime;
///
/// assert!(parse_datetime("2018-01-01T10:00:00Z").is_ok());
/// assert!(parse_datetime("Jan 5, 2019").is_ok());
/// assert!(parse_datetime("not a date").is_err());
/// ```
pub fn parse_datetime(input: &str) -> Result<NaiveDateTime> {
    let s = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Ok(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date.and_time(NaiveTime::MIN));
        }
    }
    Err(TermError::Parse(format!("unable to parse '{input}' as a date")))
}

/// Converts a string value to a date-time value.
///
/// Date-time values pass through; anything else is a type mismatch.
pub fn value_to_datetime(value: &Value) -> Result<Value> {
    match value {
        Value::Str(s) => parse_datetime(s).map(Value::DateTime),
        Value::DateTime(_) => Ok(value.clone()),
        other => Err(TermError::type_mismatch("date string", other.type_name())),
    }
}

/// Returns true if `input` matches the strftime `format` completely.
///
/// Fields the format does not mention are not required, but the fields it
/// does mention must describe a real date (no February 30th).
pub fn matches_strftime_format(input: &str, format: &str) -> bool {
    let mut parsed = Parsed::new();
    if format::parse(&mut parsed, input, StrftimeItems::new(format)).is_err() {
        return false;
    }
    let date_consistent = match parsed.to_naive_date() {
        Ok(_) => true,
        Err(e) => e.kind() == ParseErrorKind::NotEnough,
    };
    let time_consistent = match parsed.to_naive_time() {
        Ok(_) => true,
        Err(e) => e.kind() == ParseErrorKind::NotEnough,
    };
    date_consistent && time_consistent
}

/// Checks that `format` can both render and parse a timestamp.
pub fn validate_strftime_format(format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(TermError::invalid_argument(
            "strftime_format",
            format!("unable to use provided strftime_format '{format}'"),
        ));
    }
    let reference = NaiveDate::from_ymd_opt(2001, 2, 3)
        .and_then(|d| d.and_hms_micro_opt(4, 5, 6, 789))
        .ok_or_else(|| TermError::Internal("invalid reference timestamp".to_string()))?;
    let rendered = reference.format(format).to_string();
    if !matches_strftime_format(&rendered, format) {
        return Err(TermError::invalid_argument(
            "strftime_format",
            format!("strftime_format '{format}' cannot parse its own output '{rendered}'"),
        ));
    }
    Ok(())
}
