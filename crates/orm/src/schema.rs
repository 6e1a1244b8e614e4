//! Static entity descriptors
//!
//! Every entity declares its table, fields, one-hop relations, default
//! search fields and default ordering once, as a `static`. The compiler,
//! the reconciler and both stores read the same descriptor.

use rideshare_validation::{coerce, codes, format_datetime, parse_date_field, ValidationError, ValidationResult};
use serde_json::Value;
use std::fmt;

use crate::query::OrderDirection;

/// Storage type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    /// Text restricted to a fixed set of lowercase values
    Choice(&'static [&'static str]),
    Integer,
    Float,
    Boolean,
    DateTime,
    Json,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Text => write!(f, "text"),
            FieldType::Choice(_) => write!(f, "choice"),
            FieldType::Integer => write!(f, "integer"),
            FieldType::Float => write!(f, "number"),
            FieldType::Boolean => write!(f, "boolean"),
            FieldType::DateTime => write!(f, "date"),
            FieldType::Json => write!(f, "json"),
        }
    }
}

impl FieldType {
    pub fn is_textual(&self) -> bool {
        matches!(self, FieldType::Text | FieldType::Choice(_))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Float)
    }

    /// PostgreSQL type that bound text parameters are cast to
    pub fn sql_type(&self) -> &'static str {
        match self {
            FieldType::Text | FieldType::Choice(_) => "text",
            FieldType::Integer | FieldType::Float => "numeric",
            FieldType::Boolean => "boolean",
            FieldType::DateTime => "timestamptz",
            FieldType::Json => "jsonb",
        }
    }

    /// Coerce a loosely-typed request value into this type's canonical JSON
    /// form. Blank strings become `Null`; the caller decides whether null is
    /// acceptable.
    pub fn coerce(&self, field: &str, value: &Value) -> ValidationResult<Value> {
        let raw = match value {
            Value::Null => return Ok(Value::Null),
            Value::String(raw) => match coerce::clean(raw) {
                None => return Ok(Value::Null),
                Some(_) => Some(raw.as_str()),
            },
            _ => None,
        };

        match (self, raw) {
            (FieldType::Text, Some(raw)) => Ok(Value::String(raw.to_string())),
            (FieldType::Text, None) => match value {
                Value::Number(n) => Ok(Value::String(n.to_string())),
                Value::Bool(b) => Ok(Value::String(b.to_string())),
                _ => Err(self.mismatch(field, value)),
            },

            (FieldType::Choice(options), Some(raw)) => {
                let normalized = raw.trim().to_lowercase();
                if options.contains(&normalized.as_str()) {
                    Ok(Value::String(normalized))
                } else {
                    Err(ValidationError::with_code(
                        field,
                        format!("'{}' is not one of: {}", raw, options.join(", ")),
                        codes::INVALID_CHOICE,
                    )
                    .rejected(raw))
                }
            }

            (FieldType::Integer, Some(raw)) => Ok(coerce::to_int(field, raw)?.map_or(Value::Null, Value::from)),
            (FieldType::Integer, None) => match value.as_i64() {
                Some(n) => Ok(Value::from(n)),
                None => match value.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(Value::from(f as i64)),
                    _ => Err(self.mismatch(field, value)),
                },
            },

            (FieldType::Float, Some(raw)) => Ok(coerce::to_float(field, raw)?.map_or(Value::Null, Value::from)),
            (FieldType::Float, None) => match value.as_f64() {
                Some(f) => Ok(Value::from(f)),
                None => Err(self.mismatch(field, value)),
            },

            (FieldType::Boolean, Some(raw)) => Ok(coerce::to_bool(field, raw)?.map_or(Value::Null, Value::Bool)),
            (FieldType::Boolean, None) => match value {
                Value::Bool(b) => Ok(Value::Bool(*b)),
                Value::Number(n) if n.as_i64() == Some(1) => Ok(Value::Bool(true)),
                Value::Number(n) if n.as_i64() == Some(0) => Ok(Value::Bool(false)),
                _ => Err(self.mismatch(field, value)),
            },

            (FieldType::DateTime, Some(raw)) => {
                let parsed = parse_date_field(field, raw)?;
                Ok(Value::String(format_datetime(&parsed)))
            }

            (FieldType::Json, Some(raw)) => Ok(coerce::to_json(field, raw)?.unwrap_or(Value::Null)),
            (FieldType::Json, None) => Ok(value.clone()),

            (_, _) => Err(self.mismatch(field, value)),
        }
    }

    fn mismatch(&self, field: &str, value: &Value) -> ValidationError {
        ValidationError::with_code(
            field,
            format!("expected a value of type {}", self),
            codes::INVALID_TYPE,
        )
        .rejected(value.clone())
    }
}

/// A single persisted attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub ty: FieldType,
    pub nullable: bool,
    pub writable: bool,
}

impl FieldDef {
    pub const fn new(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            nullable: false,
            writable: true,
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, FieldType::Text)
    }

    pub const fn choice(name: &'static str, options: &'static [&'static str]) -> Self {
        Self::new(name, FieldType::Choice(options))
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, FieldType::Integer)
    }

    pub const fn float(name: &'static str) -> Self {
        Self::new(name, FieldType::Float)
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    pub const fn datetime(name: &'static str) -> Self {
        Self::new(name, FieldType::DateTime)
    }

    pub const fn json(name: &'static str) -> Self {
        Self::new(name, FieldType::Json)
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Primary keys, owner keys and timestamps are never written from a payload
    pub const fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }
}

/// One-hop relation to another table, embedded in the entity's snapshot
/// under `name`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub name: &'static str,
    pub table: &'static str,
    /// Column on this entity's table
    pub local_key: &'static str,
    /// Column on the related table
    pub foreign_key: &'static str,
    /// Fields of the related entity that may be searched, filtered and embedded
    pub fields: &'static [FieldDef],
}

impl Relation {
    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A resolved attribute path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath {
    pub relation: Option<&'static Relation>,
    pub field: &'static FieldDef,
}

impl FieldPath {
    pub fn ty(&self) -> FieldType {
        self.field.ty
    }
}

/// Static descriptor of a persisted entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySchema {
    pub table: &'static str,
    pub primary_key: &'static str,
    pub fields: &'static [FieldDef],
    pub relations: &'static [Relation],
    /// Paths searched when a list request carries a search term
    pub search_fields: &'static [&'static str],
    /// Ordering applied before the primary-key tie-breaker
    pub default_order: &'static [(&'static str, OrderDirection)],
}

impl EntitySchema {
    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn relation(&self, name: &str) -> Option<&'static Relation> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Resolve `field` or `relation.field`. Anything deeper, or any name the
    /// descriptor does not declare, is an unknown filter field.
    pub fn resolve(&self, path: &str) -> ValidationResult<FieldPath> {
        let mut parts = path.split('.');
        let resolved = match (parts.next(), parts.next(), parts.next()) {
            (Some(name), None, None) => self.field(name).map(|field| FieldPath {
                relation: None,
                field,
            }),
            (Some(relation), Some(name), None) => self.relation(relation).and_then(|relation| {
                relation.field(name).map(|field| FieldPath {
                    relation: Some(relation),
                    field,
                })
            }),
            _ => None,
        };
        resolved.ok_or_else(|| ValidationError::unknown_filter_field(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CAR_TYPES: &[&str] = &["sedan", "suv"];

    const OWNER_FIELDS: &[FieldDef] = &[FieldDef::integer("id"), FieldDef::text("full_name")];

    static SCHEMA: EntitySchema = EntitySchema {
        table: "rides",
        primary_key: "id",
        fields: &[
            FieldDef::integer("id").read_only(),
            FieldDef::text("car_name"),
            FieldDef::choice("car_type", CAR_TYPES),
            FieldDef::float("price").nullable(),
        ],
        relations: &[Relation {
            name: "user",
            table: "users",
            local_key: "user_id",
            foreign_key: "id",
            fields: OWNER_FIELDS,
        }],
        search_fields: &["car_name", "user.full_name"],
        default_order: &[],
    };

    #[test]
    fn test_resolve_local_and_relation_paths() {
        let local = SCHEMA.resolve("price").unwrap();
        assert!(local.relation.is_none());
        assert_eq!(local.ty(), FieldType::Float);

        let related = SCHEMA.resolve("user.full_name").unwrap();
        assert_eq!(related.relation.unwrap().table, "users");
        assert!(related.ty().is_textual());
    }

    #[test]
    fn test_resolve_rejects_unknown_and_deep_paths() {
        for path in ["nonexistent", "user.email", "user.profile.name", "car.name", ""] {
            let err = SCHEMA.resolve(path).unwrap_err();
            assert_eq!(err.message, "unknown filter field", "path {path}");
            assert_eq!(err.field, path);
        }
    }

    #[test]
    fn test_field_flags() {
        assert!(!SCHEMA.field("id").unwrap().writable);
        assert!(SCHEMA.field("price").unwrap().nullable);
        assert!(!SCHEMA.field("car_name").unwrap().nullable);
    }

    #[test]
    fn test_coerce_numbers_and_booleans() {
        assert_eq!(FieldType::Integer.coerce("seats", &json!("4")).unwrap(), json!(4));
        assert_eq!(FieldType::Integer.coerce("seats", &json!(4.0)).unwrap(), json!(4));
        assert!(FieldType::Integer.coerce("seats", &json!(4.5)).is_err());
        assert_eq!(FieldType::Float.coerce("price", &json!("12.5")).unwrap(), json!(12.5));
        assert_eq!(FieldType::Float.coerce("price", &json!(10)).unwrap(), json!(10.0));
        assert_eq!(FieldType::Boolean.coerce("active", &json!("yes")).unwrap(), json!(true));
        assert_eq!(FieldType::Boolean.coerce("active", &json!(0)).unwrap(), json!(false));

        let err = FieldType::Integer.coerce("seats", &json!("four")).unwrap_err();
        assert_eq!(err.code, codes::INVALID_TYPE);
        assert_eq!(err.field, "seats");
    }

    #[test]
    fn test_coerce_blank_is_null() {
        assert_eq!(FieldType::Text.coerce("notes", &json!("  ")).unwrap(), Value::Null);
        assert_eq!(FieldType::Integer.coerce("seats", &json!("")).unwrap(), Value::Null);
        assert_eq!(FieldType::DateTime.coerce("arrival_time", &Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_coerce_choice_and_dates() {
        let car_type = FieldType::Choice(CAR_TYPES);
        assert_eq!(car_type.coerce("car_type", &json!("SUV")).unwrap(), json!("suv"));
        let err = car_type.coerce("car_type", &json!("tank")).unwrap_err();
        assert_eq!(err.code, codes::INVALID_CHOICE);

        assert_eq!(
            FieldType::DateTime.coerce("arrival_time", &json!("05-03-2024")).unwrap(),
            json!("2024-03-05T00:00:00Z")
        );
        assert!(FieldType::DateTime.coerce("arrival_time", &json!(5)).is_err());
    }

    #[test]
    fn test_coerce_json_strings_are_decoded() {
        assert_eq!(
            FieldType::Json.coerce("other_images", &json!("[1, 2]")).unwrap(),
            json!([1, 2])
        );
        assert_eq!(
            FieldType::Json.coerce("other_images", &json!([{"id": 1}])).unwrap(),
            json!([{"id": 1}])
        );
    }
}
