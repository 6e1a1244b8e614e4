//! Persistence collaborators
//!
//! The engine never talks to a database directly; it hands compiled queries
//! and reconciled entities to a [`Store`].

use async_trait::async_trait;

use crate::error::{ModelError, ModelResult};
use crate::model::Model;
use crate::query::QueryBuilder;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Reads and writes entities of one model
#[async_trait]
pub trait Store<M: Model>: Send + Sync {
    /// Rows matching `query`, ordered and windowed as it specifies
    async fn fetch(&self, query: &QueryBuilder<M>) -> ModelResult<Vec<M>>;

    /// Number of rows matching `query`'s predicates; ordering and window are ignored
    async fn count(&self, query: &QueryBuilder<M>) -> ModelResult<u64>;

    async fn find(&self, id: i64) -> ModelResult<Option<M>>;

    /// Persist a new entity, returning it with its assigned primary key
    async fn insert(&self, entity: M) -> ModelResult<M>;

    /// Commit every field of an existing entity
    async fn save(&self, entity: &M) -> ModelResult<M>;

    /// Remove by primary key; `false` if nothing was removed
    async fn delete(&self, id: i64) -> ModelResult<bool>;

    async fn first(&self, query: &QueryBuilder<M>) -> ModelResult<Option<M>> {
        let rows = self.fetch(&query.clone().limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    async fn find_or_fail(&self, id: i64) -> ModelResult<M> {
        self.find(id)
            .await?
            .ok_or_else(|| ModelError::NotFound(M::table_name().to_string()))
    }
}
