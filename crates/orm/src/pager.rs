//! Paged reads

use rideshare_core::config::ListingConfig;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::compiler::{compile, CompiledQuery, SearchFields};
use crate::error::ModelResult;
use crate::filter::{FilterSpec, ListParams};
use crate::hooks::PredicateHook;
use crate::model::Model;
use crate::store::Store;

/// One page of results plus the total number of matching rows
///
/// `extra` carries caller-supplied metadata (e.g. aggregate statistics) and
/// is serialized alongside `data` and `total`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    #[serde(flatten, default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: u64) -> Self {
        Self {
            data,
            total,
            extra: Map::new(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Convert every row, typically into a read model
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            extra: self.extra,
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Runs a compiled query as a count plus a windowed read
///
/// The two reads are separate statements, so under concurrent writes
/// `total` and `data` may reflect slightly different states.
pub struct Pager;

impl Pager {
    pub async fn fetch<M, S>(store: &S, compiled: &CompiledQuery<M>) -> ModelResult<Page<M>>
    where
        M: Model,
        S: Store<M> + ?Sized,
    {
        let total = store.count(&compiled.query).await?;
        let data = if compiled.skip >= total {
            Vec::new()
        } else {
            store.fetch(&compiled.window()).await?
        };

        debug!(
            table = M::table_name(),
            total,
            returned = data.len(),
            skip = compiled.skip,
            limit = compiled.limit,
            "Fetched page"
        );
        Ok(Page::new(data, total))
    }
}

/// The complete list operation: normalize, compile, page
pub async fn list<M, C, S>(
    store: &S,
    params: &ListParams,
    config: &ListingConfig,
    scope: impl FnOnce(FilterSpec) -> FilterSpec,
    search: &SearchFields,
    hooks: &[PredicateHook<M, C>],
    ctx: &C,
) -> ModelResult<Page<M>>
where
    M: Model,
    S: Store<M> + ?Sized,
{
    let spec = scope(FilterSpec::normalize(params, config)?);
    let compiled = compile(&spec, search, hooks, ctx)?;
    Pager::fetch(store, &compiled).await
}
