//! Predicate hooks
//!
//! A hook is a caller-supplied function that narrows a query after every
//! request filter has been applied, e.g. "only reviews about this user" or
//! "only rides visible to this caller". Hooks run in the order supplied.

use std::fmt;

use crate::query::QueryBuilder;

type HookFn<M, C> = dyn Fn(QueryBuilder<M>, &C) -> QueryBuilder<M> + Send + Sync;

/// Typed query transformation receiving a per-request context value
pub struct PredicateHook<M, C = ()> {
    name: &'static str,
    hook: Box<HookFn<M, C>>,
}

impl<M, C> PredicateHook<M, C> {
    pub fn new<F>(name: &'static str, hook: F) -> Self
    where
        F: Fn(QueryBuilder<M>, &C) -> QueryBuilder<M> + Send + Sync + 'static,
    {
        Self {
            name,
            hook: Box::new(hook),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn apply(&self, query: QueryBuilder<M>, ctx: &C) -> QueryBuilder<M> {
        (self.hook)(query, ctx)
    }
}

impl<M, C> fmt::Debug for PredicateHook<M, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateHook").field("name", &self.name).finish()
    }
}
