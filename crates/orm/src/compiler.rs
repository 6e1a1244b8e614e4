//! Query compilation
//!
//! Turns a [`FilterSpec`] into a constrained, ordered [`QueryBuilder`] for a
//! model, plus the page window to read.

use rideshare_validation::{codes, ValidationError, ValidationResult};
use serde_json::Value;
use tracing::debug;

use crate::filter::FilterSpec;
use crate::hooks::PredicateHook;
use crate::model::Model;
use crate::query::{QueryBuilder, WhereCondition};
use crate::schema::{EntitySchema, FieldType};

/// Ordered attribute paths a free-text search is matched against
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFields(Vec<String>);

impl SearchFields {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(paths.into_iter().map(Into::into).collect())
    }

    /// The default search fields declared by the model
    pub fn of<M: Model>() -> Self {
        Self::new(M::schema().search_fields.iter().copied())
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every path must resolve to a text attribute at most one relation away
    pub fn validate(&self, schema: &EntitySchema) -> ValidationResult<()> {
        for path in &self.0 {
            let resolved = schema.resolve(path)?;
            if !resolved.ty().is_textual() {
                return Err(ValidationError::with_code(
                    path.as_str(),
                    "search fields must be text",
                    codes::UNSUPPORTED_FILTER,
                ));
            }
        }
        Ok(())
    }
}

/// A compiled list query: predicates and ordering, plus the page window
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery<M> {
    /// Predicates and ordering without LIMIT/OFFSET
    pub query: QueryBuilder<M>,
    pub skip: u64,
    pub limit: u64,
}

impl<M> CompiledQuery<M> {
    /// The query restricted to the requested page
    pub fn window(&self) -> QueryBuilder<M> {
        self.query.clone().offset(self.skip).limit(self.limit)
    }
}

/// Compile `spec` for model `M`.
///
/// The search term is OR-ed across `search`; every column filter, range and
/// custom filter is AND-ed; hooks then run left to right with `ctx`. Rows are
/// ordered by the model's default ordering with the primary key appended as
/// the final tie-breaker.
pub fn compile<M: Model, C>(
    spec: &FilterSpec,
    search: &SearchFields,
    hooks: &[PredicateHook<M, C>],
    ctx: &C,
) -> ValidationResult<CompiledQuery<M>> {
    let schema = M::schema();
    let mut query = M::query();

    if let Some(term) = &spec.search_term {
        search.validate(schema)?;
        let conditions = search
            .paths()
            .iter()
            .map(|path| WhereCondition::contains(path.as_str(), term.as_str()))
            .collect();
        query = query.where_any(conditions);
    }

    for filter in &spec.column_filters {
        let path = schema.resolve(&filter.field)?;
        let field = filter.field.as_str();
        query = match path.ty() {
            FieldType::Json => {
                return Err(ValidationError::with_code(
                    field,
                    "json fields cannot be filtered",
                    codes::UNSUPPORTED_FILTER,
                ))
            }
            ty if ty.is_textual() => match &filter.value {
                Value::Null => query,
                Value::String(term) if term.trim().is_empty() => query,
                Value::String(term) => query.where_contains(field, term.trim()),
                other => query.where_contains(field, &other.to_string()),
            },
            ty => match ty.coerce(field, &filter.value)? {
                Value::Null => query,
                value => query.where_eq(field, value),
            },
        };
    }

    if let Some(range) = &spec.date_range {
        let path = schema.resolve(&range.field)?;
        if path.ty() != FieldType::DateTime {
            return Err(unsupported_range(&range.field, "dateRange requires a date field"));
        }
        if let Some(from) = &range.from {
            query = query.where_gte(&range.field, rideshare_validation::format_datetime(from));
        }
        if let Some(to) = &range.to {
            query = query.where_lte(&range.field, rideshare_validation::format_datetime(to));
        }
    }

    if let Some(range) = &spec.number_range {
        let path = schema.resolve(&range.field)?;
        if !path.ty().is_numeric() {
            return Err(unsupported_range(&range.field, "numberRange requires a numeric field"));
        }
        if let Some(min) = range.min {
            query = query.where_gte(&range.field, min);
        }
        if let Some(max) = range.max {
            query = query.where_lte(&range.field, max);
        }
    }

    for filter in &spec.custom_filters {
        let path = schema.resolve(&filter.field)?;
        query = match path.ty().coerce(&filter.field, &filter.value)? {
            Value::Null => query.where_null(&filter.field),
            value => query.where_eq(&filter.field, value),
        };
    }

    for hook in hooks {
        query = hook.apply(query, ctx);
    }

    for (column, direction) in schema.default_order {
        query = query.order_by_direction(column, *direction);
    }
    if !query.is_ordered_by(schema.primary_key) {
        query = query.order_by(schema.primary_key);
    }

    let skip = spec.effective_skip();
    debug!(
        table = schema.table,
        clauses = query.where_clauses().len(),
        hooks = hooks.len(),
        skip,
        limit = spec.limit,
        "Compiled list query"
    );

    // The window always comes from the request, never from a hook
    Ok(CompiledQuery {
        query: query.unpaginated(),
        skip,
        limit: spec.limit,
    })
}

fn unsupported_range(field: &str, message: &str) -> ValidationError {
    ValidationError::with_code(field, message, codes::UNSUPPORTED_FILTER)
}
