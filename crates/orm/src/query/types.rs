//! Query Builder Types - Core types and enums for query building

use serde_json::Value;
use std::fmt;

/// Query operator types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    /// Case-insensitive substring match
    Contains,
    In,
    IsNull,
}

impl fmt::Display for QueryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOperator::Equal => write!(f, "="),
            QueryOperator::NotEqual => write!(f, "!="),
            QueryOperator::GreaterThan => write!(f, ">"),
            QueryOperator::GreaterThanOrEqual => write!(f, ">="),
            QueryOperator::LessThan => write!(f, "<"),
            QueryOperator::LessThanOrEqual => write!(f, "<="),
            QueryOperator::Contains => write!(f, "ILIKE"),
            QueryOperator::In => write!(f, "IN"),
            QueryOperator::IsNull => write!(f, "IS NULL"),
        }
    }
}

/// Where clause condition
///
/// `column` is an attribute path: either a field of the entity or
/// `relation.field` for a field one relation hop away.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereCondition {
    pub column: String,
    pub operator: QueryOperator,
    pub value: Option<Value>,
    pub values: Vec<Value>, // For IN
}

impl WhereCondition {
    pub fn new(column: impl Into<String>, operator: QueryOperator, value: Option<Value>) -> Self {
        Self {
            column: column.into(),
            operator,
            value,
            values: Vec::new(),
        }
    }

    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, QueryOperator::Equal, Some(value.into()))
    }

    pub fn contains(column: impl Into<String>, term: impl Into<String>) -> Self {
        Self::new(column, QueryOperator::Contains, Some(Value::String(term.into())))
    }

    pub fn is_in(column: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            values,
            ..Self::new(column, QueryOperator::In, None)
        }
    }
}

/// A single AND-ed entry of the WHERE clause
#[derive(Debug, Clone, PartialEq)]
pub enum WhereClause {
    Condition(WhereCondition),
    /// Disjunction of conditions; an empty group constrains nothing
    AnyOf(Vec<WhereCondition>),
}

impl WhereClause {
    /// Every condition in this clause
    pub fn conditions(&self) -> &[WhereCondition] {
        match self {
            WhereClause::Condition(condition) => std::slice::from_ref(condition),
            WhereClause::AnyOf(conditions) => conditions,
        }
    }
}

/// Order by direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderDirection::Asc => write!(f, "ASC"),
            OrderDirection::Desc => write!(f, "DESC"),
        }
    }
}
