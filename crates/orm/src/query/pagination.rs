//! Query Builder pagination operations

use super::builder::QueryBuilder;

impl<M> QueryBuilder<M> {
    /// Add LIMIT clause
    pub fn limit(mut self, count: u64) -> Self {
        self.limit_count = Some(count);
        self
    }

    /// Add OFFSET clause
    pub fn offset(mut self, count: u64) -> Self {
        self.offset_value = Some(count);
        self
    }

    /// Same predicates and ordering without the page window, as used for counting
    pub fn unpaginated(&self) -> Self {
        let mut query = self.clone();
        query.limit_count = None;
        query.offset_value = None;
        query
    }
}
