use super::scan;
use crate::semantic::{LiteralType, Operand};
use crate::{RuleError, RuleResult};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::OnceLock;

fn date_regex() -> &'static Regex {
    static DATE: OnceLock<Regex> = OnceLock::new();
    DATE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid"))
}

fn time_regex() -> &'static Regex {
    static TIME: OnceLock<Regex> = OnceLock::new();
    TIME.get_or_init(|| {
        Regex::new(r"^(\d{1,2}):(\d{2})(?::(\d{2}))?(?:\s*([AaPp][Mm]))?$")
            .expect("time pattern is valid")
    })
}

/// Parse `date(...)`, `time(...)` or `datetime(...)` into a typed literal.
pub(crate) fn parse_function_literal(name: &str, arguments: &str) -> RuleResult<Operand> {
    match name.to_ascii_lowercase().as_str() {
        "date" => {
            let args = quoted_arguments(arguments)
                .ok_or_else(|| RuleError::InvalidDate(arguments.trim().to_string()))?;
            match args.as_slice() {
                [value] => Ok(Operand::literal(parse_date(value)?, LiteralType::Date)),
                _ => Err(RuleError::InvalidDate(arguments.trim().to_string())),
            }
        }
        "time" => {
            let args = quoted_arguments(arguments)
                .ok_or_else(|| RuleError::InvalidTime(arguments.trim().to_string()))?;
            let normalized = match args.as_slice() {
                [value] => parse_time(value, None)?,
                [value, meridiem] => parse_time(value, Some(meridiem))?,
                _ => return Err(RuleError::InvalidTime(arguments.trim().to_string())),
            };
            Ok(Operand::literal(normalized, LiteralType::Time))
        }
        "datetime" => {
            let args = quoted_arguments(arguments)
                .ok_or_else(|| RuleError::InvalidDateTime(arguments.trim().to_string()))?;
            match args.as_slice() {
                [value] => Ok(Operand::literal(
                    parse_datetime(value)?,
                    LiteralType::DateTime,
                )),
                _ => Err(RuleError::InvalidDateTime(arguments.trim().to_string())),
            }
        }
        _ => Err(RuleError::UnknownFunction(name.to_string())),
    }
}

/// Split `'a', 'b'` into its unquoted arguments.
///
/// Returns `None` when any argument is not a single quoted string.
fn quoted_arguments(arguments: &str) -> Option<Vec<String>> {
    let mask = scan::top_level_mask(arguments).ok()?;
    let mut pieces = Vec::new();
    let mut start = 0;
    for (index, ch) in arguments.char_indices() {
        if ch == ',' && mask[index] {
            pieces.push(&arguments[start..index]);
            start = index + 1;
        }
    }
    pieces.push(&arguments[start..]);

    pieces
        .into_iter()
        .map(|piece| {
            let piece = piece.trim();
            let open = piece.chars().next().filter(|c| *c == '\'' || *c == '"')?;
            let inner = piece.get(1..piece.len().checked_sub(1)?)?;
            (piece.len() >= 2 && piece.ends_with(open) && !inner.contains(open))
                .then(|| inner.trim().to_string())
        })
        .collect()
}

/// Validate a `YYYY-MM-DD` calendar date.
/// Month must be 1-12 and the day must exist in that month (no Feb 30).
pub fn parse_date(value: &str) -> RuleResult<String> {
    let value = value.trim();
    if !date_regex().is_match(value) {
        return Err(RuleError::InvalidDate(value.to_string()));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| value.to_string())
        .map_err(|_| RuleError::InvalidDate(value.to_string()))
}

/// Validate and normalize a time to zero-padded 24-hour `HH:MM[:SS]`.
///
/// With a meridiem (`AM`/`PM`, either as a second argument or trailing the
/// time itself) the hour must be 1-12; without one it must be 0-23.
pub fn parse_time(value: &str, meridiem: Option<&str>) -> RuleResult<String> {
    let value = value.trim();
    let invalid = || RuleError::InvalidTime(value.to_string());
    let captures = time_regex().captures(value).ok_or_else(invalid)?;

    let inline_meridiem = captures.get(4).map(|m| m.as_str());
    let meridiem = match (inline_meridiem, meridiem) {
        (Some(_), Some(_)) => return Err(invalid()),
        (Some(m), None) | (None, Some(m)) => Some(m.trim().to_ascii_uppercase()),
        (None, None) => None,
    };

    let hour: u32 = captures[1].parse().map_err(|_| invalid())?;
    let minute: u32 = captures[2].parse().map_err(|_| invalid())?;
    let second: Option<u32> = match captures.get(3) {
        Some(s) => Some(s.as_str().parse().map_err(|_| invalid())?),
        None => None,
    };

    let hour = match meridiem.as_deref() {
        Some("AM") if (1..=12).contains(&hour) => hour % 12,
        Some("PM") if (1..=12).contains(&hour) => hour % 12 + 12,
        Some(_) => return Err(invalid()),
        None => hour,
    };

    NaiveTime::from_hms_opt(hour, minute, second.unwrap_or(0)).ok_or_else(invalid)?;

    Ok(match second {
        Some(second) => format!("{:02}:{:02}:{:02}", hour, minute, second),
        None => format!("{:02}:{:02}", hour, minute),
    })
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Validate an ISO 8601 date-time. Accepts:
/// - With offset: 2024-01-15T14:30:00Z or 2024-01-15T14:30:00+08:00
/// - Local: 2024-01-15T14:30:00, 2024-01-15T14:30 (or with a space)
/// - Date only: 2024-01-15
pub fn parse_datetime(value: &str) -> RuleResult<String> {
    let value = value.trim();

    if chrono::DateTime::parse_from_rfc3339(value).is_ok() {
        return Ok(value.to_string());
    }

    if DATETIME_FORMATS
        .iter()
        .any(|format| NaiveDateTime::parse_from_str(value, format).is_ok())
    {
        return Ok(value.to_string());
    }

    if date_regex().is_match(value) && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok() {
        return Ok(value.to_string());
    }

    Err(RuleError::InvalidDateTime(value.to_string()))
}
