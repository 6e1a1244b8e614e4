//! Permissive multi-format date parsing
//!
//! Clients send dates as `DD-MM-YYYY`, `DD/MM/YYYY`, `D-Mon-YY`, ISO 8601
//! dates, or ISO 8601 date-times with or without fractional seconds and
//! offsets. Values without an offset are taken as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use crate::error::{codes, ValidationError, ValidationResult};

/// Calendar-date layouts, tried in order. `%y` must come before `%Y` so
/// two-digit years are not read as the year 0024.
const DATE_FORMATS: &[&str] = &[
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%d-%b-%y",
    "%d-%b-%Y",
    "%Y-%m-%d",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a date or date-time string into a UTC timestamp
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive.and_utc());
        }
    }

    // `YYYY-MM-DDTHH` carries no minutes, which chrono will not accept alone
    if input.len() == 13 && input.as_bytes()[10] == b'T' {
        let padded = format!("{}:00", input);
        if let Ok(naive) = NaiveDateTime::parse_from_str(&padded, "%Y-%m-%dT%H:%M") {
            return Some(naive.and_utc());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(input, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }

    None
}

/// Canonical text form of a timestamp, identical to its serde representation
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse a date for `field`, reporting the rejected input on failure
pub fn parse_date_field(field: &str, input: &str) -> ValidationResult<DateTime<Utc>> {
    parse_date(input).ok_or_else(|| {
        ValidationError::with_code(
            field,
            format!("date '{}' is not in a recognised format", input),
            codes::INVALID_DATE,
        )
        .rejected(input)
    })
}
