//! Bridges the store and the query engine.

use shipdb_core::Row;
use shipdb_query::executor::{DataSource, ExecutionError, ExecutionResult, PlanRunner, Relation};
use shipdb_query::planner::LogicalPlan;
use shipdb_storage::TableCache;
use std::collections::BTreeMap;
use std::sync::Arc;

/// DataSource implementation for TableCache.
///
/// Base tables are served in primary-key order; views are expanded by the
/// runner from their defining plans.
pub struct TableCacheDataSource<'a> {
    cache: &'a TableCache,
    views: &'a BTreeMap<String, LogicalPlan>,
}

impl<'a> TableCacheDataSource<'a> {
    /// Creates a new data source from a TableCache reference and the view catalog.
    pub fn new(cache: &'a TableCache, views: &'a BTreeMap<String, LogicalPlan>) -> Self {
        Self { cache, views }
    }
}

impl<'a> DataSource for TableCacheDataSource<'a> {
    fn get_table_rows(&self, table: &str) -> ExecutionResult<Vec<Arc<Row>>> {
        let store = self
            .cache
            .get_table(table)
            .ok_or_else(|| ExecutionError::TableNotFound(table.into()))?;
        Ok(store.scan_by_pk())
    }

    fn get_column_count(&self, table: &str) -> ExecutionResult<usize> {
        self.cache
            .get_table(table)
            .map(|store| store.schema().columns().len())
            .ok_or_else(|| ExecutionError::TableNotFound(table.into()))
    }

    fn get_view(&self, name: &str) -> Option<LogicalPlan> {
        self.views.get(name).cloned()
    }
}

/// Executes a plan against a table cache.
pub fn execute_plan(
    cache: &TableCache,
    views: &BTreeMap<String, LogicalPlan>,
    plan: &LogicalPlan,
) -> ExecutionResult<Relation> {
    let data_source = TableCacheDataSource::new(cache, views);
    PlanRunner::new(&data_source).execute(plan)
}
