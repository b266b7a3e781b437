//! Repository - the entry points the transport layer calls.
//!
//! Every entry point takes a [`RequestContext`], checks it for cancellation
//! before each store read and returns typed records. Analytical queries come
//! in two strategies: a declarative plan executed by the store in one read
//! (`analytics`) and a traversal over materialised records (`traversal`).

mod analytics;
mod crud;
pub mod plans;
mod projection;
mod traversal;

pub use projection::{TableName, TableRow};

use crate::config::Config;
use crate::context::RequestContext;
use crate::convert::{decode_all, FromValues, TableRecord};
use crate::database::Database;
use crate::error::Result;
use shipdb_query::ast::{Expr, SortOrder};
use shipdb_query::planner::LogicalPlan;
use std::sync::Arc;

/// Data access for parts, customers and shipments.
#[derive(Clone)]
pub struct Repository {
    db: Arc<Database>,
    config: Config,
}

impl Repository {
    /// Creates a repository over a shared store handle.
    pub fn new(db: Arc<Database>, config: Config) -> Self {
        Self { db, config }
    }

    /// Opens the store from `config` and wraps it in a repository.
    pub fn connect(config: Config) -> Result<Self> {
        let db = Database::connect(&config)?;
        Ok(Self::new(Arc::new(db), config))
    }

    /// Returns the store handle.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Executes a plan as one store read and decodes every row.
    fn query<T: FromValues>(&self, ctx: &RequestContext, plan: &LogicalPlan) -> Result<Vec<T>> {
        ctx.check()?;
        let relation = self.db.execute(plan)?;
        Ok(decode_all(relation.into_values())?)
    }

    /// Loads a whole base table, optionally reordered.
    fn load<T: TableRecord>(
        &self,
        ctx: &RequestContext,
        order_by: Vec<(Expr, SortOrder)>,
    ) -> Result<Vec<T>> {
        let scan = LogicalPlan::scan(T::TABLE);
        let plan = if order_by.is_empty() {
            scan
        } else {
            LogicalPlan::sort(scan, order_by)
        };
        self.query(ctx, &plan)
    }
}
