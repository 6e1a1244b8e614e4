//! Entity snapshots
//!
//! A [`Snapshot`] is the plain, ordered field → value map of an entity or of
//! an update payload. Controllers use it to post-process values before they
//! are committed (converting coordinates, attaching uploaded media, parsing
//! dates) and to build new entities in create flows.

use rideshare_validation::{codes, coerce, format_datetime, parse_date_field, ValidationError, ValidationResult};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ModelError, ModelResult};
use crate::reconcile::{UpdateField, UpdatePayload};

/// Ordered field → value map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(Map<String, Value>);

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot an entity; its serde representation must be a JSON object
    pub fn of<T: Serialize + ?Sized>(entity: &T) -> ModelResult<Self> {
        match serde_json::to_value(entity)? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ModelError::Serialization(format!(
                "expected an object, found {}",
                kind_of(&other)
            ))),
        }
    }

    /// The present fields of an update payload; `Null` fields map to `null`
    pub fn of_payload(payload: &UpdatePayload) -> Self {
        let mut map = Map::new();
        for (field, update) in payload.iter() {
            match update {
                UpdateField::Absent => {}
                UpdateField::Null => {
                    map.insert(field.to_string(), Value::Null);
                }
                UpdateField::Value(value) => {
                    map.insert(field.to_string(), value.clone());
                }
            }
        }
        Self(map)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.shift_remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Normalize a date string in place to an RFC 3339 UTC timestamp.
    /// Missing and `null` values are left alone; blank strings become `null`.
    pub fn parse_date(&mut self, field: &str) -> ValidationResult<()> {
        let normalized = match self.0.get(field) {
            None | Some(Value::Null) => return Ok(()),
            Some(Value::String(raw)) => match coerce::clean(raw) {
                None => Value::Null,
                Some(_) => Value::String(format_datetime(&parse_date_field(field, raw)?)),
            },
            Some(other) => {
                return Err(ValidationError::with_code(
                    field,
                    "date must be a string",
                    codes::INVALID_DATE,
                )
                .rejected(other.clone()))
            }
        };
        self.0.insert(field.to_string(), normalized);
        Ok(())
    }

    /// Associate a related record (e.g. freshly stored media) under `field`
    pub fn attach<T: Serialize + ?Sized>(&mut self, field: &str, related: &T) -> ModelResult<()> {
        let value = serde_json::to_value(related)?;
        self.0.insert(field.to_string(), value);
        Ok(())
    }

    /// Build an entity from this snapshot
    pub fn into_entity<M: DeserializeOwned>(self) -> ModelResult<M> {
        Ok(serde_json::from_value(Value::Object(self.0))?)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Snapshot {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Snapshot> for Value {
    fn from(snapshot: Snapshot) -> Self {
        Value::Object(snapshot.0)
    }
}

/// Plain field → value map of any serializable entity
pub fn serialize_obj<T: Serialize + ?Sized>(entity: &T) -> ModelResult<Map<String, Value>> {
    Snapshot::of(entity).map(Snapshot::into_map)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
