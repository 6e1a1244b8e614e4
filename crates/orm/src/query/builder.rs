//! Query Builder - Core builder implementation

use std::fmt;
use std::marker::PhantomData;

use super::types::*;

/// Query builder for constructing reads against a single entity
///
/// The builder only records predicates, ordering and the page window; it is
/// rendered to SQL by [`crate::store::PgStore`] or evaluated in process by
/// [`crate::store::MemoryStore`].
pub struct QueryBuilder<M = ()> {
    pub(crate) where_clauses: Vec<WhereClause>,
    pub(crate) order_by: Vec<(String, OrderDirection)>,
    pub(crate) limit_count: Option<u64>,
    pub(crate) offset_value: Option<u64>,
    _phantom: PhantomData<M>,
}

impl<M> Clone for QueryBuilder<M> {
    fn clone(&self) -> Self {
        Self {
            where_clauses: self.where_clauses.clone(),
            order_by: self.order_by.clone(),
            limit_count: self.limit_count,
            offset_value: self.offset_value,
            _phantom: PhantomData,
        }
    }
}

impl<M> fmt::Debug for QueryBuilder<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("where_clauses", &self.where_clauses)
            .field("order_by", &self.order_by)
            .field("limit_count", &self.limit_count)
            .field("offset_value", &self.offset_value)
            .finish()
    }
}

impl<M> PartialEq for QueryBuilder<M> {
    fn eq(&self, other: &Self) -> bool {
        self.where_clauses == other.where_clauses
            && self.order_by == other.order_by
            && self.limit_count == other.limit_count
            && self.offset_value == other.offset_value
    }
}

impl<M> Default for QueryBuilder<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> QueryBuilder<M> {
    /// Create a new query builder
    pub fn new() -> Self {
        Self {
            where_clauses: Vec::new(),
            order_by: Vec::new(),
            limit_count: None,
            offset_value: None,
            _phantom: PhantomData,
        }
    }

    /// AND-ed predicates in insertion order
    pub fn where_clauses(&self) -> &[WhereClause] {
        &self.where_clauses
    }

    pub fn order_clauses(&self) -> &[(String, OrderDirection)] {
        &self.order_by
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.limit_count
    }

    pub fn offset_value(&self) -> Option<u64> {
        self.offset_value
    }
}
