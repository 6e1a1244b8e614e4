//! Model trait binding an entity type to its static descriptor

use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;

use crate::query::QueryBuilder;
use crate::schema::EntitySchema;

/// A persisted entity the list/update engine can operate on
///
/// Entities move through the engine as JSON snapshots, so the serde
/// representation must use the field names declared in [`Model::schema`]
/// (dates as RFC 3339 strings, enums as lowercase strings, embedded
/// relations as nested objects keyed by relation name).
pub trait Model: Send + Sync + Debug + Clone + Serialize + DeserializeOwned + 'static {
    /// Static descriptor of this entity
    fn schema() -> &'static EntitySchema;

    /// Get the primary key value; `None` before the first insert
    fn primary_key(&self) -> Option<i64>;

    fn set_primary_key(&mut self, key: i64);

    fn table_name() -> &'static str {
        Self::schema().table
    }

    fn primary_key_name() -> &'static str {
        Self::schema().primary_key
    }

    /// Start an unconstrained query over this entity
    fn query() -> QueryBuilder<Self> {
        QueryBuilder::new()
    }
}
