//! Partial-update reconciliation
//!
//! An [`UpdatePayload`] distinguishes a field the caller did not send
//! ([`UpdateField::Absent`]) from one explicitly cleared
//! ([`UpdateField::Null`]) and one given a new value. The [`Reconciler`]
//! validates every present field against the model's descriptor before
//! touching the entity, then assigns only the fields whose value changes.
//! It never persists anything.

use rideshare_validation::{codes, parse_date, ValidationError, ValidationResult};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ModelError, ModelResult};
use crate::model::Model;
use crate::schema::{EntitySchema, FieldDef, FieldType};
use crate::snapshot::Snapshot;

/// Tri-state value of one payload field
#[derive(Debug, Clone, Default, PartialEq)]
pub enum UpdateField {
    /// Not sent; the entity keeps its current value
    #[default]
    Absent,
    /// Explicitly cleared
    Null,
    Value(Value),
}

impl UpdateField {
    pub fn of(value: impl Into<Value>) -> Self {
        UpdateField::Value(value.into())
    }

    /// Form-field semantics: not submitted is absent, blank is null
    pub fn from_form(raw: Option<String>) -> Self {
        match raw {
            None => UpdateField::Absent,
            Some(s) if s.trim().is_empty() => UpdateField::Null,
            Some(s) => UpdateField::Value(Value::String(s)),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, UpdateField::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, UpdateField::Null)
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            UpdateField::Value(value) => Some(value),
            _ => None,
        }
    }
}

impl From<Value> for UpdateField {
    /// JSON semantics: `null` clears, anything else is a value
    fn from(value: Value) -> Self {
        match value {
            Value::Null => UpdateField::Null,
            other => UpdateField::Value(other),
        }
    }
}

/// Ordered field → [`UpdateField`] mapping built once per request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePayload {
    fields: Vec<(String, UpdateField)>,
}

impl UpdatePayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON body: missing keys are absent, `null` clears
    pub fn from_json(body: &Value) -> ValidationResult<Self> {
        match body {
            Value::Object(map) => Ok(Self::from_map(map.clone())),
            _ => Err(ValidationError::with_code(
                "body",
                "update payload must be a JSON object",
                codes::INVALID_TYPE,
            )),
        }
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        map.into_iter()
            .map(|(field, value)| (field, UpdateField::from(value)))
            .collect()
    }

    /// Build from submitted form fields: `None` is absent, blank is null
    pub fn from_form<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<String>)>,
        K: Into<String>,
    {
        fields
            .into_iter()
            .map(|(field, raw)| (field.into(), UpdateField::from_form(raw)))
            .collect()
    }

    /// Set a field, replacing any earlier entry; `Absent` removes it
    pub fn set(&mut self, field: impl Into<String>, update: UpdateField) {
        let field = field.into();
        self.fields.retain(|(name, _)| *name != field);
        if !update.is_absent() {
            self.fields.push((field, update));
        }
    }

    pub fn with(mut self, field: impl Into<String>, update: UpdateField) -> Self {
        self.set(field, update);
        self
    }

    /// The submitted state of `field`; `None` when it was not submitted
    pub fn get(&self, field: &str) -> Option<&UpdateField> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, update)| update)
    }

    pub fn remove(&mut self, field: &str) -> UpdateField {
        match self.fields.iter().position(|(name, _)| name == field) {
            Some(index) => self.fields.remove(index).1,
            None => UpdateField::Absent,
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UpdateField)> {
        self.fields.iter().map(|(name, update)| (name.as_str(), update))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, UpdateField)> for UpdatePayload {
    fn from_iter<T: IntoIterator<Item = (String, UpdateField)>>(iter: T) -> Self {
        let mut payload = UpdatePayload::new();
        for (field, update) in iter {
            payload.set(field, update);
        }
        payload
    }
}

impl<'de> Deserialize<'de> for UpdatePayload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Map::<String, Value>::deserialize(deserializer).map(Self::from_map)
    }
}

/// Outcome of a reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciled {
    /// Fields whose value actually changed, in payload order
    pub changed: Vec<String>,
}

impl Reconciled {
    pub fn is_changed(&self, field: &str) -> bool {
        self.changed.iter().any(|name| name == field)
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }
}

/// Applies update payloads to entities
pub struct Reconciler;

impl Reconciler {
    /// Validate `payload` against `M`'s descriptor and apply it to `entity`.
    ///
    /// On error the entity is left untouched.
    pub fn reconcile<M: Model>(entity: &mut M, payload: &UpdatePayload) -> ModelResult<Reconciled> {
        let schema = M::schema();
        let planned = Self::plan(schema, payload)?;

        let mut snapshot = Snapshot::of(&*entity)?;
        let mut applied = Vec::new();
        for (def, value) in planned {
            let unchanged = match snapshot.get(def.name) {
                Some(current) => same_value(def.ty, current, &value),
                None => value.is_null(),
            };
            if unchanged {
                continue;
            }
            snapshot.insert(def.name, value.clone());
            applied.push((def, value));
        }

        if !applied.is_empty() {
            *entity = Self::materialize(snapshot, &applied)?;
        }

        let changed: Vec<String> = applied.iter().map(|(def, _)| def.name.to_string()).collect();
        debug!(table = schema.table, changed = ?changed, "Reconciled update payload");
        Ok(Reconciled { changed })
    }

    /// Build an entity from `snapshot` after `applied` values were written
    /// into it.
    ///
    /// A value the entity type cannot hold is reported against the applied
    /// field that carries it; `body` is used only when no single field
    /// accounts for the failure.
    pub fn materialize<M: Model>(snapshot: Snapshot, applied: &[(&FieldDef, Value)]) -> ModelResult<M> {
        let message = match snapshot.clone().into_entity() {
            Err(ModelError::Serialization(message)) => message,
            built => return built,
        };

        let culprit = applied.iter().find(|(def, _)| {
            let mut without = snapshot.clone();
            without.remove(def.name);
            match without.into_entity::<M>() {
                Ok(_) => true,
                Err(ModelError::Serialization(rest)) => rest == format!("missing field `{}`", def.name),
                Err(_) => false,
            }
        });

        let err = match culprit {
            Some((def, value)) => {
                ValidationError::with_code(def.name, message, codes::INVALID_TYPE).rejected(value.clone())
            }
            None => ValidationError::with_code("body", message, codes::INVALID_TYPE),
        };
        Err(err.into())
    }

    /// Validate and coerce every present field without applying anything
    pub fn plan(schema: &EntitySchema, payload: &UpdatePayload) -> ValidationResult<Vec<(&'static FieldDef, Value)>> {
        let mut planned = Vec::with_capacity(payload.len());
        for (name, update) in payload.iter() {
            if update.is_absent() {
                continue;
            }

            let def = schema
                .field(name)
                .ok_or_else(|| ValidationError::unknown_field(name))?;
            if !def.writable {
                return Err(ValidationError::read_only(name));
            }

            let value = match update {
                UpdateField::Value(raw) => def.ty.coerce(name, raw)?,
                _ => Value::Null,
            };
            if value.is_null() && !def.nullable {
                return Err(ValidationError::not_nullable(name));
            }
            planned.push((def, value));
        }
        Ok(planned)
    }
}

/// Equality that ignores representation differences between a stored value
/// and its coerced replacement
fn same_value(ty: FieldType, current: &Value, next: &Value) -> bool {
    match (ty, current, next) {
        (FieldType::Integer | FieldType::Float, Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (FieldType::DateTime, Value::String(a), Value::String(b)) => match (parse_date(a), parse_date(b)) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        },
        (_, a, b) => a == b,
    }
}
