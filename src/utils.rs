//! Date normalization for goal months and value days

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::core::error::{AppError, Result};

/// Accepted layouts for a date with a time component
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Digit counts of the `-` separated fields in `YYYY-MM`
const MONTH_SHAPE: &[usize] = &[4, 2];

/// Digit counts of the `-` separated fields in `YYYY-MM-DD`
const DAY_SHAPE: &[usize] = &[4, 2, 2];

/// Normalize a `YYYY-MM` month, rejecting months that do not exist
pub fn normalize_month(input: &str) -> Result<String> {
    let invalid = || AppError::validation(format!("Invalid month '{}', expected YYYY-MM", input));

    if !has_shape(input, MONTH_SHAPE) {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(&format!("{}-01", input), "%Y-%m-%d")
        .map(|date| date.format("%Y-%m").to_string())
        .map_err(|_| invalid())
}

/// Normalize a day or timestamp down to its `YYYY-MM-DD` date
pub fn normalize_day(input: &str) -> Result<String> {
    parse_day(input)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .ok_or_else(|| {
            AppError::validation(format!("Invalid date '{}', expected YYYY-MM-DD", input))
        })
}

/// Whether `input` is exactly the dash-separated digit fields in `shape`
fn has_shape(input: &str, shape: &[usize]) -> bool {
    let fields: Vec<&str> = input.split('-').collect();

    fields.len() == shape.len()
        && fields
            .iter()
            .zip(shape)
            .all(|(field, &len)| field.len() == len && field.bytes().all(|b| b.is_ascii_digit()))
}

fn parse_day(input: &str) -> Option<NaiveDate> {
    // The date always leads and is followed by nothing or a time separator
    let date_part = input.get(..10)?;
    let rest = &input[10..];
    if !has_shape(date_part, DAY_SHAPE)
        || !(rest.is_empty() || rest.starts_with('T') || rest.starts_with(' '))
    {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date);
    }

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(input, format) {
            return Some(datetime.date());
        }
    }

    // Keep the calendar date as written, not shifted to UTC
    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|datetime| datetime.date_naive())
}
