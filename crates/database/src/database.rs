//! Database - the store handle shared by every request.
//!
//! Owns the table cache behind a reader-writer lock, the view catalog and a
//! counter of store reads. Every closure passed to [`Database::read`] or
//! [`Database::write`] runs under a single lock acquisition, so one plan is
//! one atomic read.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::query_engine::execute_plan;
use crate::schema;
use parking_lot::RwLock;
use shipdb_query::executor::Relation;
use shipdb_query::planner::LogicalPlan;
use shipdb_storage::TableCache;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

const MEMORY_SCHEME: &str = "memory://";

/// The main database handle.
pub struct Database {
    name: String,
    cache: RwLock<TableCache>,
    views: BTreeMap<String, LogicalPlan>,
    reads: AtomicU64,
}

impl Database {
    /// Opens the store named by `config.store_url` and bootstraps the schema.
    ///
    /// Only `memory://<name>` URLs are supported.
    pub fn connect(config: &Config) -> Result<Self> {
        let url = config.store_url.as_str();
        let name = url
            .strip_prefix(MEMORY_SCHEME)
            .ok_or_else(|| Error::connection(url, "unsupported store scheme"))?;
        if name.is_empty() {
            return Err(Error::connection(url, "missing store name"));
        }

        let mut cache = TableCache::new();
        for table in schema::tables()? {
            cache.create_table(table)?;
        }
        let views: BTreeMap<String, LogicalPlan> = schema::views()
            .into_iter()
            .map(|(name, plan)| (name.to_string(), plan))
            .collect();

        info!(
            store = name,
            tables = cache.table_names().len(),
            views = views.len(),
            "store opened"
        );

        Ok(Self {
            name: name.to_string(),
            cache: RwLock::new(cache),
            views,
            reads: AtomicU64::new(0),
        })
    }

    /// Returns the store name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of store reads executed so far.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Returns the registered view names.
    pub fn view_names(&self) -> Vec<&str> {
        self.views.keys().map(String::as_str).collect()
    }

    /// Runs `f` under one shared lock and counts it as one store read.
    pub fn read<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&TableCache) -> Result<T>,
    {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let cache = self.cache.read();
        f(&cache)
    }

    /// Runs `f` under the exclusive lock.
    pub fn write<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut TableCache) -> shipdb_core::Result<T>,
    {
        let mut cache = self.cache.write();
        Ok(f(&mut cache)?)
    }

    /// Executes a plan as one atomic read.
    pub fn execute(&self, plan: &LogicalPlan) -> Result<Relation> {
        let relation = self.read(|cache| Ok(execute_plan(cache, &self.views, plan)?))?;
        debug!(tables = ?plan.scanned_tables(), rows = relation.len(), "plan executed");
        Ok(relation)
    }
}
