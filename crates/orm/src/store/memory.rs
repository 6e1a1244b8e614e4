//! In-process store
//!
//! Evaluates compiled queries against entity snapshots with the same
//! semantics the PostgreSQL renderer produces: case-insensitive substring
//! matching, SQL null handling, and `NULLS LAST` for ascending order.

use async_trait::async_trait;
use rideshare_validation::{codes, parse_date, ValidationError, ValidationResult};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use tokio::sync::RwLock;
use tracing::debug;

use super::Store;
use crate::error::{ModelError, ModelResult};
use crate::model::Model;
use crate::query::{OrderDirection, QueryBuilder, QueryOperator, WhereClause, WhereCondition};
use crate::schema::{EntitySchema, FieldPath, FieldType};
use crate::snapshot::Snapshot;

struct Rows<M> {
    rows: Vec<M>,
    next_id: i64,
}

/// Store keeping rows in memory behind an async `RwLock`
pub struct MemoryStore<M> {
    inner: RwLock<Rows<M>>,
}

impl<M: Model> Default for MemoryStore<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> MemoryStore<M> {
    pub fn new() -> Self {
        Self::with_rows(Vec::new())
    }

    /// Seed the store; rows without a primary key are assigned one
    pub fn with_rows(rows: Vec<M>) -> Self {
        let mut next_id = rows.iter().filter_map(|row| row.primary_key()).max().unwrap_or(0) + 1;
        let rows = rows
            .into_iter()
            .map(|mut row| {
                if row.primary_key().is_none() {
                    row.set_primary_key(next_id);
                    next_id += 1;
                }
                row
            })
            .collect();

        Self {
            inner: RwLock::new(Rows { rows, next_id }),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Every stored row in insertion order
    pub async fn all(&self) -> Vec<M> {
        self.inner.read().await.rows.clone()
    }

    fn select(rows: &[M], query: &QueryBuilder<M>) -> ModelResult<Vec<(Map<String, Value>, M)>> {
        let schema = M::schema();
        for clause in query.where_clauses() {
            for condition in clause.conditions() {
                schema.resolve(&condition.column)?;
            }
        }

        let mut matched = Vec::new();
        for row in rows {
            let snapshot = Snapshot::of(row)?.into_map();
            let mut keep = true;
            for clause in query.where_clauses() {
                if !evaluate(schema, &snapshot, clause)? {
                    keep = false;
                    break;
                }
            }
            if keep {
                matched.push((snapshot, row.clone()));
            }
        }
        Ok(matched)
    }
}

#[async_trait]
impl<M: Model> Store<M> for MemoryStore<M> {
    async fn fetch(&self, query: &QueryBuilder<M>) -> ModelResult<Vec<M>> {
        let schema = M::schema();
        let guard = self.inner.read().await;
        let mut matched = Self::select(&guard.rows, query)?;
        drop(guard);

        let mut keys = Vec::with_capacity(query.order_clauses().len());
        for (column, direction) in query.order_clauses() {
            let path = schema.resolve(column)?;
            if path.relation.is_some() {
                return Err(ValidationError::with_code(
                    column.as_str(),
                    "ordering must use a field of the entity itself",
                    codes::UNSUPPORTED_FILTER,
                )
                .into());
            }
            keys.push((path, *direction));
        }
        matched.sort_by(|(a, _), (b, _)| {
            for (path, direction) in &keys {
                let ordering = null_last(path.ty(), lookup(a, path), lookup(b, path));
                let ordering = match direction {
                    OrderDirection::Asc => ordering,
                    OrderDirection::Desc => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });

        let offset = usize::try_from(query.offset_value().unwrap_or(0)).unwrap_or(usize::MAX);
        let limit = query.limit_value().map_or(usize::MAX, |limit| limit as usize);
        let rows: Vec<M> = matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(_, row)| row)
            .collect();

        debug!(table = schema.table, returned = rows.len(), "Memory store fetch");
        Ok(rows)
    }

    async fn count(&self, query: &QueryBuilder<M>) -> ModelResult<u64> {
        let guard = self.inner.read().await;
        Ok(Self::select(&guard.rows, query)?.len() as u64)
    }

    async fn find(&self, id: i64) -> ModelResult<Option<M>> {
        let guard = self.inner.read().await;
        Ok(guard.rows.iter().find(|row| row.primary_key() == Some(id)).cloned())
    }

    async fn insert(&self, mut entity: M) -> ModelResult<M> {
        let mut guard = self.inner.write().await;
        let id = match entity.primary_key() {
            Some(id) if guard.rows.iter().any(|row| row.primary_key() == Some(id)) => {
                return Err(ModelError::Database(format!(
                    "duplicate key {} in table '{}'",
                    id,
                    M::table_name()
                )));
            }
            Some(id) => id,
            None => {
                entity.set_primary_key(guard.next_id);
                guard.next_id
            }
        };
        guard.next_id = guard.next_id.max(id + 1);
        guard.rows.push(entity.clone());
        Ok(entity)
    }

    async fn save(&self, entity: &M) -> ModelResult<M> {
        let id = entity.primary_key().ok_or(ModelError::MissingPrimaryKey)?;
        let mut guard = self.inner.write().await;
        let slot = guard
            .rows
            .iter_mut()
            .find(|row| row.primary_key() == Some(id))
            .ok_or_else(|| ModelError::NotFound(M::table_name().to_string()))?;
        *slot = entity.clone();
        Ok(entity.clone())
    }

    async fn delete(&self, id: i64) -> ModelResult<bool> {
        let mut guard = self.inner.write().await;
        let before = guard.rows.len();
        guard.rows.retain(|row| row.primary_key() != Some(id));
        Ok(guard.rows.len() != before)
    }
}

fn evaluate(schema: &EntitySchema, row: &Map<String, Value>, clause: &WhereClause) -> ValidationResult<bool> {
    match clause {
        WhereClause::Condition(condition) => matches(schema, row, condition),
        WhereClause::AnyOf(conditions) if conditions.is_empty() => Ok(true),
        WhereClause::AnyOf(conditions) => {
            for condition in conditions {
                if matches(schema, row, condition)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}

fn matches(schema: &EntitySchema, row: &Map<String, Value>, condition: &WhereCondition) -> ValidationResult<bool> {
    let path = schema.resolve(&condition.column)?;
    let ty = path.ty();
    let actual = lookup(row, &path);
    let expected = condition.value.as_ref().filter(|v| !v.is_null());

    let is = |wanted: fn(Ordering) -> bool| match (actual, expected) {
        (Some(a), Some(e)) => compare(ty, a, e).map_or(false, wanted),
        _ => false,
    };

    Ok(match condition.operator {
        QueryOperator::IsNull => actual.is_none(),
        QueryOperator::Contains => match (actual, expected) {
            (Some(a), Some(e)) => text_of(a).to_lowercase().contains(&text_of(e).to_lowercase()),
            _ => false,
        },
        QueryOperator::In => actual.map_or(false, |a| {
            condition
                .values
                .iter()
                .any(|v| compare(ty, a, v) == Some(Ordering::Equal))
        }),
        QueryOperator::Equal if expected.is_none() => actual.is_none(),
        QueryOperator::NotEqual if expected.is_none() => actual.is_some(),
        QueryOperator::Equal => is(|o| o == Ordering::Equal),
        QueryOperator::NotEqual => is(|o| o != Ordering::Equal),
        QueryOperator::GreaterThan => is(|o| o == Ordering::Greater),
        QueryOperator::GreaterThanOrEqual => is(|o| o != Ordering::Less),
        QueryOperator::LessThan => is(|o| o == Ordering::Less),
        QueryOperator::LessThanOrEqual => is(|o| o != Ordering::Greater),
    })
}

/// Non-null value at `path`, following one embedded relation
fn lookup<'a>(row: &'a Map<String, Value>, path: &FieldPath) -> Option<&'a Value> {
    let value = match path.relation {
        None => row.get(path.field.name),
        Some(relation) => row.get(relation.name)?.as_object()?.get(path.field.name),
    };
    value.filter(|v| !v.is_null())
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn bool_of(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Compare two non-null values as `ty`; `None` when they are not comparable
fn compare(ty: FieldType, a: &Value, b: &Value) -> Option<Ordering> {
    match ty {
        FieldType::Integer | FieldType::Float => number_of(a)?.partial_cmp(&number_of(b)?),
        FieldType::Boolean => Some(bool_of(a)?.cmp(&bool_of(b)?)),
        FieldType::DateTime => Some(parse_date(a.as_str()?)?.cmp(&parse_date(b.as_str()?)?)),
        FieldType::Text | FieldType::Choice(_) => Some(text_of(a).cmp(&text_of(b))),
        FieldType::Json => (a == b).then_some(Ordering::Equal),
    }
}

/// Ascending comparison with nulls after every value
fn null_last(ty: FieldType, a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => compare(ty, a, b).unwrap_or(Ordering::Equal),
    }
}
