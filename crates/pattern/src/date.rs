//! Date patterns: `dateValid`, `dateAfter`, `dateBetween`, `dateAge`, etc.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::error::PatternError;

pub const DATE_NAMES: &[&str] = &[
    "dateValid",
    "dateAfter",
    "dateBefore",
    "dateBetween",
    "dateAge",
    "dateEquals",
    "dateFormat",
];

/// Parse a value accepted anywhere a date is expected: RFC3339/ISO-8601
/// strings, `YYYY-MM-DD`, `M/D/YYYY`, epoch milliseconds (as a JSON number
/// or a numeric string).
pub fn parse_date(actual: &Value) -> Option<DateTime<Utc>> {
    match actual {
        Value::Number(n) => n.as_i64().map(epoch_millis_to_datetime),
        Value::String(s) => parse_date_str(s),
        _ => None,
    }
}

fn parse_date_str(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(millis) = raw.parse::<i64>() {
        return Some(epoch_millis_to_datetime(millis));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%m/%d/%Y") {
        return date.and_hms_opt(0, 0, 0).map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc));
    }
    None
}

fn epoch_millis_to_datetime(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_else(|| DateTime::from_timestamp(0, 0).unwrap())
}

/// Parse a `dateAge` duration like `30m`, `24h`, `7d`.
fn parse_duration(raw: &str) -> Option<chrono::Duration> {
    let raw = raw.trim();
    let (digits, unit) = raw.split_at(raw.find(|c: char| !c.is_ascii_digit()).unwrap_or(raw.len()));
    let amount: i64 = digits.parse().ok()?;
    match unit {
        "ms" => Some(chrono::Duration::milliseconds(amount)),
        "s" => Some(chrono::Duration::seconds(amount)),
        "m" => Some(chrono::Duration::minutes(amount)),
        "h" => Some(chrono::Duration::hours(amount)),
        "d" => Some(chrono::Duration::days(amount)),
        _ => None,
    }
}

fn parse_date_arg(pattern: &'static str, raw: &str) -> Result<DateTime<Utc>, PatternError> {
    parse_date_str(raw).ok_or_else(|| PatternError::InvalidArgument {
        pattern,
        message: format!("'{raw}' is not a recognized date"),
    })
}

/// Split a `START:END` argument tail into its two date strings.
///
/// Neither the first nor the last `:` is reliable as the separator: both
/// halves may be ISO-8601 timestamps whose time-of-day (and, with a
/// numeric offset, timezone) components already contain colons. Instead,
/// try each `:` in turn and take the first split point where both halves
/// parse as dates in their own right.
fn split_date_range(raw: &str) -> Option<(&str, &str)> {
    raw.match_indices(':').find_map(|(idx, _)| {
        let (start, end) = (&raw[..idx], &raw[idx + 1..]);
        (parse_date_str(start).is_some() && parse_date_str(end).is_some()).then_some((start, end))
    })
}

pub fn evaluate(name: &str, raw_args: Option<&str>, actual: &Value) -> Result<bool, PatternError> {
    if name == "dateValid" {
        return Ok(parse_date(actual).is_some());
    }

    let require_args = |pattern: &'static str, expected: &'static str| {
        raw_args.ok_or(PatternError::ArityMismatch {
            pattern,
            expected,
            raw_args: String::new(),
        })
    };

    match name {
        "dateAfter" => {
            let target = parse_date_arg("dateAfter", require_args("dateAfter", "a date")?)?;
            Ok(parse_date(actual).map(|d| d > target).unwrap_or(false))
        }
        "dateBefore" => {
            let target = parse_date_arg("dateBefore", require_args("dateBefore", "a date")?)?;
            Ok(parse_date(actual).map(|d| d < target).unwrap_or(false))
        }
        "dateEquals" => {
            let target = parse_date_arg("dateEquals", require_args("dateEquals", "a date")?)?;
            Ok(parse_date(actual).map(|d| d == target).unwrap_or(false))
        }
        "dateBetween" => {
            let raw = require_args("dateBetween", "START:END")?;
            let (start_raw, end_raw) = split_date_range(raw).ok_or_else(|| PatternError::ArityMismatch {
                pattern: "dateBetween",
                expected: "START:END",
                raw_args: raw.to_string(),
            })?;
            let start = parse_date_arg("dateBetween", start_raw)?;
            let end = parse_date_arg("dateBetween", end_raw)?;
            Ok(parse_date(actual).map(|d| d >= start && d <= end).unwrap_or(false))
        }
        "dateAge" => {
            let raw = require_args("dateAge", "a duration like 24h")?;
            let max_age = parse_duration(raw).ok_or_else(|| PatternError::InvalidArgument {
                pattern: "dateAge",
                message: format!("'{raw}' is not a duration like 30m, 24h, 7d"),
            })?;
            let now = Utc::now();
            Ok(parse_date(actual)
                .map(|d| d <= now && now - d <= max_age)
                .unwrap_or(false))
        }
        "dateFormat" => {
            let format = require_args("dateFormat", "one of iso, iso-date, iso-time, us-date, timestamp")?;
            let text = match actual {
                Value::String(s) => s.as_str(),
                _ => return Ok(false),
            };
            Ok(matches_date_format(format, text))
        }
        _ => unreachable!("date::evaluate dispatched for non-date pattern {name}"),
    }
}

fn matches_date_format(format: &str, text: &str) -> bool {
    match format {
        "iso" => DateTime::parse_from_rfc3339(text).is_ok(),
        "iso-date" => NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok(),
        "iso-time" => chrono::NaiveTime::parse_from_str(text, "%H:%M:%S").is_ok(),
        "us-date" => NaiveDate::parse_from_str(text, "%m/%d/%Y").is_ok(),
        "timestamp" => text.parse::<i64>().is_ok(),
        _ => false,
    }
}
