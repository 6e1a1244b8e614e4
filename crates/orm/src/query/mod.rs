//! Query Builder - Typed predicate, ordering and window construction
//!
//! The builder is split by concern:
//! - types.rs: operators, conditions, clauses and directions
//! - builder.rs: the `QueryBuilder` struct
//! - where_clause.rs: WHERE operations
//! - ordering.rs: ORDER BY operations
//! - pagination.rs: LIMIT/OFFSET operations
//! - sql_generation.rs: PostgreSQL rendering

pub mod builder;
pub mod ordering;
pub mod pagination;
pub mod sql_generation;
pub mod types;
pub mod where_clause;

pub use builder::QueryBuilder;
pub use sql_generation::SqlParams;
pub use types::*;
