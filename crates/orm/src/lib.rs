//! # rideshare-orm: list and update engine
//!
//! Shared machinery behind every list and update endpoint of the rideshare
//! backend: filter normalization, query compilation with predicate hooks,
//! paged reads, tri-state update reconciliation and entity snapshots.
//! Persistence goes through the [`Store`] trait, implemented for PostgreSQL
//! and for an in-process store.

pub mod compiler;
pub mod error;
pub mod filter;
pub mod hooks;
pub mod model;
pub mod pager;
pub mod query;
pub mod reconcile;
pub mod schema;
pub mod security;
pub mod snapshot;
pub mod store;


// Re-export the engine surface
pub use compiler::{compile, CompiledQuery, SearchFields};
pub use error::{ModelError, ModelResult};
pub use filter::{ColumnFilter, DateRange, FilterSpec, ListParams, NumberRange, RawParam};
pub use hooks::PredicateHook;
pub use model::Model;
pub use pager::{list, Page, Pager};
pub use query::{OrderDirection, QueryBuilder, QueryOperator, WhereClause, WhereCondition};
pub use reconcile::{Reconciled, Reconciler, UpdateField, UpdatePayload};
pub use schema::{EntitySchema, FieldDef, FieldPath, FieldType, Relation};
pub use snapshot::{serialize_obj, Snapshot};
pub use store::{MemoryStore, PgStore, Store};
