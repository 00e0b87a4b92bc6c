//! Unix timestamp <-> calendar date conversions.

use std::fmt::Display;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Asia::Shanghai;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, ToolError};

/// Inputs with a smaller magnitude are read as seconds.
pub const SECONDS_THRESHOLD: i64 = 100_000_000_000;

pub const LABEL_UTC: &str = "UTC Time";
pub const LABEL_LOCAL: &str = "Local Time";
pub const LABEL_ISO: &str = "ISO 8601";
pub const LABEL_DATE: &str = "Date";
pub const LABEL_TIME: &str = "Time";
pub const LABEL_CHINA: &str = "China Time (UTC+8)";
pub const LABEL_SECONDS: &str = "Unix Timestamp (seconds)";
pub const LABEL_MILLIS: &str = "Unix Timestamp (milliseconds)";

const UTC_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";
const LOCAL_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";
const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";
const CHINA_FORMAT: &str = "%Y/%-m/%-d %H:%M:%S";

/// Wall-clock layouts read in the local zone.
const LOCAL_LAYOUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    pub label: String,
    pub value: Value,
}

impl Conversion {
    fn new(label: &str, value: impl Into<Value>) -> Self {
        Self { label: label.to_string(), value: value.into() }
    }
}

/// Leading integer of `input`, ignoring whatever follows (`"17abc"` -> 17).
pub fn parse_leading_int(input: &str) -> Result<i64> {
    let trimmed = input.trim_start();
    let digits_start = usize::from(trimmed.starts_with(['-', '+']));
    let end = trimmed[digits_start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(trimmed.len(), |i| i + digits_start);
    if end == digits_start {
        return Err(ToolError::InvalidTimestamp(input.trim().to_string()));
    }
    trimmed[..end]
        .parse()
        .map_err(|_| ToolError::InvalidTimestamp(input.trim().to_string()))
}

fn to_datetime(input: &str) -> Result<DateTime<Utc>> {
    if input.trim().is_empty() {
        return Err(ToolError::EmptyInput);
    }
    let n = parse_leading_int(input)?;
    let millis = if n.unsigned_abs() < SECONDS_THRESHOLD.unsigned_abs() { n.checked_mul(1000) } else { Some(n) };
    millis
        .and_then(DateTime::from_timestamp_millis)
        .ok_or_else(|| ToolError::InvalidTimestamp(input.trim().to_string()))
}

/// Render a timestamp in every supported representation, using `local`
/// for the local-time rows.
pub fn timestamp_to_date_with<Tz>(input: &str, local: &Tz) -> Result<Vec<Conversion>>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let utc = to_datetime(input)?;
    let local_dt = utc.with_timezone(local);
    let china = utc.with_timezone(&Shanghai);

    Ok(vec![
        Conversion::new(LABEL_UTC, utc.format(UTC_FORMAT).to_string()),
        Conversion::new(LABEL_LOCAL, local_dt.format(LOCAL_FORMAT).to_string()),
        Conversion::new(LABEL_ISO, utc.format(ISO_FORMAT).to_string()),
        Conversion::new(LABEL_DATE, utc.format("%Y-%m-%d").to_string()),
        Conversion::new(LABEL_TIME, local_dt.format("%H:%M:%S").to_string()),
        Conversion::new(LABEL_CHINA, china.format(CHINA_FORMAT).to_string()),
    ])
}

pub fn timestamp_to_date(input: &str) -> Result<Vec<Conversion>> {
    timestamp_to_date_with(input, &Local)
}

fn parse_date<Tz: TimeZone>(input: &str, local: &Tz) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Some(dt.with_timezone(&Utc));
    }
    // A bare ISO date is midnight UTC.
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y/%m/%d") {
        let naive = date.and_hms_opt(0, 0, 0)?;
        return local.from_local_datetime(&naive).earliest().map(|dt| dt.with_timezone(&Utc));
    }
    LOCAL_LAYOUTS.iter().find_map(|layout| {
        let naive = NaiveDateTime::parse_from_str(input, layout).ok()?;
        local.from_local_datetime(&naive).earliest().map(|dt| dt.with_timezone(&Utc))
    })
}

/// Unix seconds (floored) and milliseconds for a date string.
pub fn date_to_timestamp_with<Tz: TimeZone>(input: &str, local: &Tz) -> Result<Vec<Conversion>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ToolError::EmptyInput);
    }
    let dt = parse_date(trimmed, local).ok_or_else(|| ToolError::InvalidDate(trimmed.to_string()))?;
    let millis = dt.timestamp_millis();

    Ok(vec![
        Conversion::new(LABEL_SECONDS, millis.div_euclid(1000)),
        Conversion::new(LABEL_MILLIS, millis),
    ])
}

pub fn date_to_timestamp(input: &str) -> Result<Vec<Conversion>> {
    date_to_timestamp_with(input, &Local)
}

/// `label: value` lines, as stored in history.
pub fn render(conversions: &[Conversion]) -> String {
    conversions
        .iter()
        .map(|c| match &c.value {
            Value::String(s) => format!("{}: {}", c.label, s),
            other => format!("{}: {}", c.label, other),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn current_timestamp() -> i64 {
    Utc::now().timestamp()
}

pub fn current_iso() -> String {
    Utc::now().format(ISO_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use pretty_assertions::assert_eq;

    fn values(conversions: &[Conversion]) -> Vec<String> {
        conversions
            .iter()
            .map(|c| c.value.as_str().map(str::to_string).unwrap_or_else(|| c.value.to_string()))
            .collect()
    }

    #[test]
    fn test_seconds_to_date() {
        let out = timestamp_to_date_with("1704067200", &Utc).unwrap();
        assert_eq!(
            values(&out),
            vec![
                "Mon, 01 Jan 2024 00:00:00 GMT",
                "1/1/2024, 12:00:00 AM",
                "2024-01-01T00:00:00.000Z",
                "2024-01-01",
                "00:00:00",
                "2024/1/1 08:00:00",
            ]
        );
    }

    #[test]
    fn test_millis_and_trailing_garbage() {
        let out = timestamp_to_date_with("1704067200123ms", &Utc).unwrap();
        assert_eq!(out[2].value, "2024-01-01T00:00:00.123Z");
    }

    #[test]
    fn test_local_zone_rows() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let out = timestamp_to_date_with("1704110400", &tokyo).unwrap();
        assert_eq!(out[1].value, "1/1/2024, 9:00:00 PM");
        assert_eq!(out[4].value, "21:00:00");
    }

    #[test]
    fn test_invalid_timestamp() {
        assert!(matches!(timestamp_to_date_with("abc", &Utc), Err(ToolError::InvalidTimestamp(_))));
        assert!(matches!(timestamp_to_date_with("", &Utc), Err(ToolError::EmptyInput)));
        assert_eq!(parse_leading_int("  -42.9").unwrap(), -42);
        assert!(parse_leading_int("-").is_err());
    }

    #[test]
    fn test_extreme_timestamps() {
        for input in ["-9223372036854775808", "9223372036854775807"] {
            assert!(matches!(timestamp_to_date_with(input, &Utc), Err(ToolError::InvalidTimestamp(_))));
        }
        let out = timestamp_to_date_with("-1", &Utc).unwrap();
        assert_eq!(out[2].value, "1969-12-31T23:59:59.000Z");
    }

    #[test]
    fn test_date_to_timestamp_formats() {
        let shanghai = FixedOffset::east_opt(8 * 3600).unwrap();
        for input in [
            "2024-01-01",
            "2024-01-01T00:00:00Z",
            "2024-01-01T08:00:00+08:00",
            "Mon, 01 Jan 2024 00:00:00 +0000",
            "2024-01-01 08:00:00",
            "2024/01/01 08:00",
        ] {
            let out = date_to_timestamp_with(input, &shanghai).unwrap();
            assert_eq!(out[0].value, 1704067200, "input {input}");
            assert_eq!(out[1].value, 1704067200000i64, "input {input}");
        }
    }

    #[test]
    fn test_seconds_are_floored() {
        let out = date_to_timestamp_with("1969-12-31T23:59:59.500Z", &Utc).unwrap();
        assert_eq!(out[0].value, -1);
        assert_eq!(out[1].value, -500);
    }

    #[test]
    fn test_invalid_date() {
        assert!(matches!(date_to_timestamp_with("yesterday", &Utc), Err(ToolError::InvalidDate(_))));
    }

    #[test]
    fn test_render() {
        let out = date_to_timestamp_with("2024-01-01", &Utc).unwrap();
        assert_eq!(
            render(&out),
            "Unix Timestamp (seconds): 1704067200\nUnix Timestamp (milliseconds): 1704067200000"
        );
    }
}
