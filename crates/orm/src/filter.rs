//! Filter normalization
//!
//! Turns loosely-typed list parameters (as they arrive in a query string or
//! JSON body) into a [`FilterSpec`]. Structured parameters may be sent either
//! as JSON-encoded strings (`columnFilters=[["car_type","suv"]]`) or as
//! already decoded arrays. Field names are not checked here; the query
//! compiler resolves them against the entity's descriptor.

use chrono::{DateTime, Utc};
use rideshare_core::config::ListingConfig;
use rideshare_validation::{coerce, codes, parse_date_field, ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// A structured parameter, JSON-encoded or already decoded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawParam {
    Encoded(String),
    Decoded(Vec<Value>),
}

impl RawParam {
    /// Decode to a JSON array; a blank or `null` encoding is an empty array
    pub fn decode(&self, name: &str) -> ValidationResult<Vec<Value>> {
        match self {
            RawParam::Decoded(items) => Ok(items.clone()),
            RawParam::Encoded(raw) => match coerce::clean(raw) {
                None => Ok(Vec::new()),
                Some(text) => match serde_json::from_str::<Value>(text) {
                    Ok(Value::Array(items)) => Ok(items),
                    Ok(Value::Null) => Ok(Vec::new()),
                    _ => Err(malformed(name, format!("{} must be a JSON array", name)).rejected(raw.as_str())),
                },
            },
        }
    }

    /// Append an item. An encoding that does not decode is kept as is so
    /// normalization still rejects it.
    fn push(&mut self, item: Value) {
        match self {
            RawParam::Decoded(items) => items.push(item),
            RawParam::Encoded(_) => {
                if let Ok(mut items) = self.decode("") {
                    items.push(item);
                    *self = RawParam::Decoded(items);
                }
            }
        }
    }
}

/// Raw list parameters as supplied by the transport layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListParams {
    pub search_term: Option<String>,
    /// `[[field, value], ...]`
    pub column_filters: Option<RawParam>,
    /// `[field, from, to]`
    pub date_range: Option<RawParam>,
    /// `[field, min, max]`
    pub number_range: Option<RawParam>,
    pub page: Option<i64>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    pub fn column_filter(mut self, field: &str, value: impl Into<Value>) -> Self {
        let pair = Value::Array(vec![Value::from(field), value.into()]);
        self.column_filters
            .get_or_insert_with(|| RawParam::Decoded(Vec::new()))
            .push(pair);
        self
    }

    pub fn date_range(mut self, field: &str, from: Option<&str>, to: Option<&str>) -> Self {
        self.date_range = Some(RawParam::Decoded(vec![
            Value::from(field),
            from.map_or(Value::Null, Value::from),
            to.map_or(Value::Null, Value::from),
        ]));
        self
    }

    pub fn number_range(mut self, field: &str, min: Option<f64>, max: Option<f64>) -> Self {
        self.number_range = Some(RawParam::Decoded(vec![
            Value::from(field),
            min.map_or(Value::Null, Value::from),
            max.map_or(Value::Null, Value::from),
        ]));
        self
    }

    pub fn page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn skip(mut self, skip: i64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// `field` compared against `value`
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFilter {
    pub field: String,
    pub value: Value,
}

impl ColumnFilter {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Inclusive date window; a missing bound leaves that side open
#[derive(Debug, Clone, PartialEq)]
pub struct DateRange {
    pub field: String,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Inclusive numeric window; a missing bound leaves that side open
#[derive(Debug, Clone, PartialEq)]
pub struct NumberRange {
    pub field: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Normalized, validated list request
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub search_term: Option<String>,
    pub column_filters: Vec<ColumnFilter>,
    pub date_range: Option<DateRange>,
    pub number_range: Option<NumberRange>,
    /// Structural filters added by the caller; always exact-match and AND-ed
    pub custom_filters: Vec<ColumnFilter>,
    /// 1-based page; overrides `skip` when present
    pub page: Option<u64>,
    pub skip: u64,
    pub limit: u64,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self::unfiltered(&ListingConfig::default())
    }
}

impl FilterSpec {
    /// No constraints, first page at the configured default size
    pub fn unfiltered(config: &ListingConfig) -> Self {
        Self {
            search_term: None,
            column_filters: Vec::new(),
            date_range: None,
            number_range: None,
            custom_filters: Vec::new(),
            page: None,
            skip: 0,
            limit: config.default_limit,
        }
    }

    /// Validate and normalize raw list parameters
    pub fn normalize(params: &ListParams, config: &ListingConfig) -> ValidationResult<Self> {
        let limit = match params.limit {
            None => config.default_limit,
            Some(limit) if limit >= 1 && (limit as u64) <= config.max_limit => limit as u64,
            Some(limit) => {
                warn!(limit, max = config.max_limit, "Rejected list request: limit out of bounds");
                return Err(ValidationError::limit_out_of_bounds(limit, config.max_limit));
            }
        };

        let page = match params.page {
            None => None,
            Some(page) if page >= 1 => Some(page as u64),
            Some(page) => {
                return Err(
                    ValidationError::with_code("page", "page must be at least 1", codes::INVALID_PAGE)
                        .rejected(page),
                )
            }
        };

        let skip = match params.skip {
            None => 0,
            Some(skip) if skip >= 0 => skip as u64,
            Some(skip) => {
                return Err(
                    ValidationError::with_code("skip", "skip must not be negative", codes::INVALID_PAGE)
                        .rejected(skip),
                )
            }
        };

        let search_term = params
            .search_term
            .as_deref()
            .and_then(coerce::clean)
            .map(str::to_string);

        let column_filters = match &params.column_filters {
            Some(raw) => parse_column_filters(raw)?,
            None => Vec::new(),
        };

        let date_range = match &params.date_range {
            Some(raw) => parse_date_range(raw)?,
            None => None,
        };

        let number_range = match &params.number_range {
            Some(raw) => parse_number_range(raw)?,
            None => None,
        };

        Ok(Self {
            search_term,
            column_filters,
            date_range,
            number_range,
            custom_filters: Vec::new(),
            page,
            skip,
            limit,
        })
    }

    /// Add a structural equality filter that request input cannot override
    pub fn scoped_to(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.custom_filters.push(ColumnFilter::new(field, value));
        self
    }

    /// Offset of the first row; `page` wins over `skip`.
    /// Saturates rather than overflowing for absurdly large pages.
    pub fn effective_skip(&self) -> u64 {
        match self.page {
            Some(page) => (page - 1).saturating_mul(self.limit),
            None => self.skip,
        }
    }

    /// Whether no request-level constraint is present
    pub fn is_unconstrained(&self) -> bool {
        self.search_term.is_none()
            && self.column_filters.is_empty()
            && self.date_range.is_none()
            && self.number_range.is_none()
            && self.custom_filters.is_empty()
    }
}

fn malformed(field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError::with_code(field, message, codes::MALFORMED_FILTER)
}

fn parse_column_filters(raw: &RawParam) -> ValidationResult<Vec<ColumnFilter>> {
    raw.decode("columnFilters")?
        .into_iter()
        .map(|item| match item {
            Value::Array(pair) => match <[Value; 2]>::try_from(pair) {
                Ok([Value::String(field), value]) if coerce::clean(&field).is_some() => {
                    Ok(ColumnFilter::new(field.trim(), value))
                }
                Ok(pair) => Err(malformed("columnFilters", "malformed column filter")
                    .rejected(Value::Array(pair.to_vec()))),
                Err(pair) => {
                    Err(malformed("columnFilters", "malformed column filter").rejected(Value::Array(pair)))
                }
            },
            other => Err(malformed("columnFilters", "malformed column filter").rejected(other)),
        })
        .collect()
}

/// Split `[field, lower, upper]`; an empty array means no range
fn range_parts(raw: &RawParam, name: &str) -> ValidationResult<Option<(String, Value, Value)>> {
    let items = raw.decode(name)?;
    if items.is_empty() {
        return Ok(None);
    }
    match <[Value; 3]>::try_from(items) {
        Ok([Value::String(field), lower, upper]) if coerce::clean(&field).is_some() => {
            Ok(Some((field.trim().to_string(), lower, upper)))
        }
        Ok(items) => Err(malformed(name, format!("{} must be [field, from, to]", name))
            .rejected(Value::Array(items.to_vec()))),
        Err(items) => Err(malformed(name, format!("{} must be [field, from, to]", name))
            .rejected(Value::Array(items))),
    }
}

fn parse_date_range(raw: &RawParam) -> ValidationResult<Option<DateRange>> {
    let Some((field, from, to)) = range_parts(raw, "dateRange")? else {
        return Ok(None);
    };

    let bound = |value: &Value| -> ValidationResult<Option<DateTime<Utc>>> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) if coerce::clean(s).is_none() => Ok(None),
            Value::String(s) => parse_date_field(&field, s).map(Some),
            other => Err(ValidationError::with_code(
                field.as_str(),
                "date bound must be a string",
                codes::INVALID_DATE,
            )
            .rejected(other.clone())),
        }
    };

    let from = bound(&from)?;
    let to = bound(&to)?;
    Ok(Some(DateRange { field, from, to }))
}

fn parse_number_range(raw: &RawParam) -> ValidationResult<Option<NumberRange>> {
    let Some((field, min, max)) = range_parts(raw, "numberRange")? else {
        return Ok(None);
    };

    let bound = |value: &Value| -> ValidationResult<Option<f64>> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => coerce::to_float(&field, s),
            Value::Number(n) => Ok(n.as_f64()),
            other => Err(ValidationError::with_code(
                field.as_str(),
                "number bound must be numeric",
                codes::INVALID_TYPE,
            )
            .rejected(other.clone())),
        }
    };

    let min = bound(&min)?;
    let max = bound(&max)?;
    Ok(Some(NumberRange { field, min, max }))
}
