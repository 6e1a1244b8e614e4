//! Query Builder SQL generation
//!
//! Queries render to PostgreSQL with every value bound as a text parameter
//! and cast to the field's storage type. Each selected row comes back as a
//! single `jsonb` document that deserializes straight into the model.

use rideshare_validation::{codes, ValidationError, ValidationResult};
use serde_json::Value;

use super::builder::QueryBuilder;
use super::types::*;
use crate::model::Model;
use crate::schema::{EntitySchema, FieldPath, FieldType, Relation};
use crate::security::{contains_pattern, escape_identifier, quote_literal};

/// Alias of the entity's table in generated SQL
pub const ROW_ALIAS: &str = "t";
/// Alias of a related table inside `EXISTS` and embedding sub-selects
pub const RELATION_ALIAS: &str = "r";

/// Positional parameters collected while rendering
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SqlParams {
    values: Vec<Option<String>>,
}

impl SqlParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` and return its cast placeholder, e.g. `$3::numeric`
    pub fn bind(&mut self, value: &Value, ty: FieldType) -> String {
        let text = match (value, ty) {
            (Value::Null, _) => None,
            (other, FieldType::Json) => Some(other.to_string()),
            (Value::String(s), _) => Some(s.clone()),
            (Value::Bool(b), _) => Some(b.to_string()),
            (Value::Number(n), _) => Some(n.to_string()),
            (other, _) => Some(other.to_string()),
        };
        self.bind_text(text, ty.sql_type())
    }

    pub fn bind_text(&mut self, text: Option<String>, sql_type: &str) -> String {
        self.values.push(text);
        format!("${}::{}", self.values.len(), sql_type)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_inner(self) -> Vec<Option<String>> {
        self.values
    }
}

/// Qualified, escaped column reference
pub fn column_ref(alias: &str, column: &str) -> String {
    format!("{}.{}", alias, escape_identifier(column))
}

/// `to_jsonb(t)` merged with one embedded object per declared relation
pub fn select_document(schema: &EntitySchema) -> String {
    let mut select = format!("to_jsonb({})", ROW_ALIAS);
    for relation in schema.relations {
        select.push_str(&format!(
            " || jsonb_build_object({}, {})",
            quote_literal(relation.name),
            embed_relation(relation)
        ));
    }
    select
}

fn embed_relation(relation: &Relation) -> String {
    let pairs: Vec<String> = relation
        .fields
        .iter()
        .map(|field| {
            format!(
                "{}, {}",
                quote_literal(field.name),
                column_ref(RELATION_ALIAS, field.name)
            )
        })
        .collect();
    format!(
        "(SELECT jsonb_build_object({}) FROM {} {} WHERE {} LIMIT 1)",
        pairs.join(", "),
        escape_identifier(relation.table),
        RELATION_ALIAS,
        join_condition(relation)
    )
}

fn join_condition(relation: &Relation) -> String {
    format!(
        "{} = {}",
        column_ref(RELATION_ALIAS, relation.foreign_key),
        column_ref(ROW_ALIAS, relation.local_key)
    )
}

impl<M: Model> QueryBuilder<M> {
    /// Generate the row-fetching SELECT and its parameters
    pub fn to_sql_with_params(&self) -> ValidationResult<(String, Vec<Option<String>>)> {
        let schema = M::schema();
        let mut params = SqlParams::new();
        let mut sql = format!(
            "SELECT {} AS document FROM {} {}",
            select_document(schema),
            escape_identifier(schema.table),
            ROW_ALIAS
        );

        self.build_where_clause(schema, &mut sql, &mut params)?;
        self.build_order_limit_clause(schema, &mut sql)?;

        Ok((sql, params.into_inner()))
    }

    /// Generate `SELECT COUNT(*)` over the same predicates, ignoring the window
    pub fn to_count_sql_with_params(&self) -> ValidationResult<(String, Vec<Option<String>>)> {
        let schema = M::schema();
        let mut params = SqlParams::new();
        let mut sql = format!(
            "SELECT COUNT(*) FROM {} {}",
            escape_identifier(schema.table),
            ROW_ALIAS
        );

        self.build_where_clause(schema, &mut sql, &mut params)?;

        Ok((sql, params.into_inner()))
    }

    /// Helper method to build WHERE clauses
    fn build_where_clause(
        &self,
        schema: &EntitySchema,
        sql: &mut String,
        params: &mut SqlParams,
    ) -> ValidationResult<()> {
        let mut rendered = Vec::with_capacity(self.where_clauses.len());
        for clause in &self.where_clauses {
            match clause {
                WhereClause::Condition(condition) => {
                    rendered.push(render_condition(schema, condition, params)?);
                }
                WhereClause::AnyOf(conditions) if conditions.is_empty() => {}
                WhereClause::AnyOf(conditions) => {
                    let parts = conditions
                        .iter()
                        .map(|condition| render_condition(schema, condition, params))
                        .collect::<ValidationResult<Vec<_>>>()?;
                    rendered.push(format!("({})", parts.join(" OR ")));
                }
            }
        }

        if !rendered.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&rendered.join(" AND "));
        }
        Ok(())
    }

    /// Helper method to build ORDER BY and LIMIT clauses
    fn build_order_limit_clause(&self, schema: &EntitySchema, sql: &mut String) -> ValidationResult<()> {
        if !self.order_by.is_empty() {
            let mut parts = Vec::with_capacity(self.order_by.len());
            for (column, direction) in &self.order_by {
                let path = schema.resolve(column)?;
                if path.relation.is_some() {
                    return Err(ValidationError::with_code(
                        column.as_str(),
                        "ordering must use a field of the entity itself",
                        codes::UNSUPPORTED_FILTER,
                    ));
                }
                parts.push(format!("{} {}", column_ref(ROW_ALIAS, path.field.name), direction));
            }
            sql.push_str(" ORDER BY ");
            sql.push_str(&parts.join(", "));
        }

        if let Some(limit) = self.limit_count {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        // OFFSET is a bigint
        if let Some(offset) = self.offset_value {
            sql.push_str(&format!(" OFFSET {}", offset.min(i64::MAX as u64)));
        }
        Ok(())
    }
}

fn render_condition(
    schema: &EntitySchema,
    condition: &WhereCondition,
    params: &mut SqlParams,
) -> ValidationResult<String> {
    let path = schema.resolve(&condition.column)?;
    let alias = if path.relation.is_some() { RELATION_ALIAS } else { ROW_ALIAS };
    let lhs = column_ref(alias, path.field.name);
    let predicate = render_predicate(&path, &lhs, condition, params);

    Ok(match path.relation {
        None => predicate,
        Some(relation) => format!(
            "EXISTS (SELECT 1 FROM {} {} WHERE {} AND {})",
            escape_identifier(relation.table),
            RELATION_ALIAS,
            join_condition(relation),
            predicate
        ),
    })
}

fn render_predicate(
    path: &FieldPath,
    lhs: &str,
    condition: &WhereCondition,
    params: &mut SqlParams,
) -> String {
    let value = condition.value.as_ref().filter(|v| !v.is_null());

    match condition.operator {
        QueryOperator::Contains => match value {
            Some(Value::String(term)) => format!(
                "{}::text ILIKE {}",
                lhs,
                params.bind_text(Some(contains_pattern(term)), "text")
            ),
            Some(other) => format!(
                "{}::text ILIKE {}",
                lhs,
                params.bind_text(Some(contains_pattern(&other.to_string())), "text")
            ),
            None => "FALSE".to_string(),
        },
        QueryOperator::IsNull => {
            format!("{} {}", lhs, condition.operator)
        }
        QueryOperator::In => {
            let placeholders: Vec<String> = condition
                .values
                .iter()
                .filter(|v| !v.is_null())
                .map(|v| params.bind(v, path.ty()))
                .collect();
            if placeholders.is_empty() {
                "FALSE".to_string()
            } else {
                format!("{} IN ({})", lhs, placeholders.join(", "))
            }
        }
        QueryOperator::Equal if value.is_none() => format!("{} IS NULL", lhs),
        QueryOperator::NotEqual if value.is_none() => format!("{} IS NOT NULL", lhs),
        operator => match value {
            Some(v) => format!("{} {} {}", lhs, operator, params.bind(v, path.ty())),
            None => "FALSE".to_string(),
        },
    }
}
