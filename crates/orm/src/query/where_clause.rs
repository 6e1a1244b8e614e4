//! Query Builder WHERE clause operations

use super::builder::QueryBuilder;
use super::types::*;
use serde_json::Value;

impl<M> QueryBuilder<M> {
    fn push_condition(mut self, condition: WhereCondition) -> Self {
        self.where_clauses.push(WhereClause::Condition(condition));
        self
    }

    /// Add WHERE condition with equality
    pub fn where_eq<T>(self, column: &str, value: T) -> Self
    where
        T: Into<Value>,
    {
        self.push_condition(WhereCondition::eq(column, value))
    }

    /// Add WHERE condition with not equal
    pub fn where_ne<T: Into<Value>>(self, column: &str, value: T) -> Self {
        self.push_condition(WhereCondition::new(
            column,
            QueryOperator::NotEqual,
            Some(value.into()),
        ))
    }

    /// Add WHERE condition with greater than
    pub fn where_gt<T: Into<Value>>(self, column: &str, value: T) -> Self {
        self.push_condition(WhereCondition::new(
            column,
            QueryOperator::GreaterThan,
            Some(value.into()),
        ))
    }

    /// Add WHERE condition with greater than or equal
    pub fn where_gte<T: Into<Value>>(self, column: &str, value: T) -> Self {
        self.push_condition(WhereCondition::new(
            column,
            QueryOperator::GreaterThanOrEqual,
            Some(value.into()),
        ))
    }

    /// Add WHERE condition with less than
    pub fn where_lt<T: Into<Value>>(self, column: &str, value: T) -> Self {
        self.push_condition(WhereCondition::new(
            column,
            QueryOperator::LessThan,
            Some(value.into()),
        ))
    }

    /// Add WHERE condition with less than or equal
    pub fn where_lte<T: Into<Value>>(self, column: &str, value: T) -> Self {
        self.push_condition(WhereCondition::new(
            column,
            QueryOperator::LessThanOrEqual,
            Some(value.into()),
        ))
    }

    /// Add case-insensitive substring match; wildcards in `term` are literal
    pub fn where_contains(self, column: &str, term: &str) -> Self {
        self.push_condition(WhereCondition::contains(column, term))
    }

    /// Add WHERE IN condition
    pub fn where_in<T: Into<Value>>(self, column: &str, values: Vec<T>) -> Self {
        self.push_condition(WhereCondition::is_in(
            column,
            values.into_iter().map(Into::into).collect(),
        ))
    }

    /// Add WHERE IS NULL condition
    pub fn where_null(self, column: &str) -> Self {
        self.push_condition(WhereCondition::new(column, QueryOperator::IsNull, None))
    }

    /// Add a group of OR-ed conditions, AND-ed with everything else.
    /// An empty group is ignored.
    pub fn where_any(mut self, conditions: Vec<WhereCondition>) -> Self {
        if !conditions.is_empty() {
            self.where_clauses.push(WhereClause::AnyOf(conditions));
        }
        self
    }
}
