//! Permissive coercion of loosely-typed request values
//!
//! Every helper treats a blank string as "no value" and returns `Ok(None)`.
//! Anything else either coerces or fails with a [`ValidationError`] naming
//! the field and the rejected input.

use serde_json::Value;

use crate::error::{codes, ValidationError, ValidationResult};

/// Trim the input, mapping blank strings to `None`
pub fn clean(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// `"true"/"1"/"yes"` and `"false"/"0"/"no"`, case-insensitively
pub fn to_bool(field: &str, raw: &str) -> ValidationResult<Option<bool>> {
    let Some(value) = clean(raw) else {
        return Ok(None);
    };
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(Some(true)),
        "false" | "0" | "no" => Ok(Some(false)),
        _ => Err(type_error(field, raw, "a boolean")),
    }
}

pub fn to_int(field: &str, raw: &str) -> ValidationResult<Option<i64>> {
    match clean(raw) {
        None => Ok(None),
        Some(value) => value
            .parse::<i64>()
            .map(Some)
            .map_err(|_| type_error(field, raw, "an integer")),
    }
}

pub fn to_float(field: &str, raw: &str) -> ValidationResult<Option<f64>> {
    match clean(raw) {
        None => Ok(None),
        Some(value) => match value.parse::<f64>() {
            Ok(number) if number.is_finite() => Ok(Some(number)),
            _ => Err(type_error(field, raw, "a number")),
        },
    }
}

/// Decode a JSON document carried inside a string
pub fn to_json(field: &str, raw: &str) -> ValidationResult<Option<Value>> {
    match clean(raw) {
        None => Ok(None),
        Some(value) => serde_json::from_str(value).map(Some).map_err(|_| {
            ValidationError::with_code(field, format!("invalid JSON: {}", raw), codes::INVALID_JSON)
                .rejected(raw)
        }),
    }
}

/// Split `"a,b,c"`, `["a,b,c"]` or `["a", "b"]` into trimmed, non-empty items
pub fn parse_list(value: &Value) -> Vec<String> {
    fn split(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    }

    match value {
        Value::String(raw) => split(raw),
        Value::Array(items) => match items.as_slice() {
            [Value::String(single)] => split(single),
            _ => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => clean(s).map(str::to_string),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect(),
        },
        _ => Vec::new(),
    }
}

fn type_error(field: &str, raw: &str, expected: &str) -> ValidationError {
    ValidationError::with_code(
        field,
        format!("'{}' is not {}", raw, expected),
        codes::INVALID_TYPE,
    )
    .rejected(raw)
}
