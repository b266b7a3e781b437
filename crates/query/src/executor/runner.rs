//! Plan runner - executes logical query plans against a data source.
//!
//! The runner recursively evaluates plan nodes, resolving column references to
//! row offsets once per node and handing the work to the matching operator.

use crate::ast::{AggregateFunc, Expr, SortOrder};
use crate::executor::{
    distinct_relation, AggregateExecutor, FilterExecutor, HashJoin, ProjectExecutor, Relation,
    SortExecutor, WindowExecutor,
};
use crate::planner::LogicalPlan;
use shipdb_core::Row;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Nesting limit for view expansion.
const MAX_VIEW_DEPTH: usize = 16;

/// Error type for plan execution.
#[derive(Clone, Debug, PartialEq)]
pub enum ExecutionError {
    /// Table not found in data source.
    TableNotFound(String),
    /// Column not found in the input relation.
    ColumnNotFound { table: String, column: String },
    /// Invalid operation.
    InvalidOperation(String),
    /// Arithmetic or aggregate result out of numeric range.
    NumericOverflow(String),
}

impl core::fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ExecutionError::TableNotFound(t) => write!(f, "Table not found: {}", t),
            ExecutionError::ColumnNotFound { table, column } => {
                write!(f, "Column {}.{} not found", table, column)
            }
            ExecutionError::InvalidOperation(msg) => write!(f, "Invalid operation: {}", msg),
            ExecutionError::NumericOverflow(msg) => write!(f, "Numeric overflow in {}", msg),
        }
    }
}

impl std::error::Error for ExecutionError {}

/// Result type for plan execution.
pub type ExecutionResult<T> = Result<T, ExecutionError>;

/// Data source trait for providing table and view data.
pub trait DataSource {
    /// Returns all rows from a table, in primary key order.
    fn get_table_rows(&self, table: &str) -> ExecutionResult<Vec<Arc<Row>>>;

    /// Returns the column count for a table.
    fn get_column_count(&self, table: &str) -> ExecutionResult<usize>;

    /// Returns the defining plan of a view, if `name` is a view.
    fn get_view(&self, name: &str) -> Option<LogicalPlan> {
        let _ = name;
        None
    }
}

/// Plan runner - executes logical query plans.
pub struct PlanRunner<'a, D: DataSource> {
    data_source: &'a D,
}

impl<'a, D: DataSource> PlanRunner<'a, D> {
    /// Creates a new plan runner with the given data source.
    pub fn new(data_source: &'a D) -> Self {
        Self { data_source }
    }

    /// Executes a plan and returns the result relation.
    pub fn execute(&self, plan: &LogicalPlan) -> ExecutionResult<Relation> {
        self.execute_at(plan, 0)
    }

    fn execute_at(&self, plan: &LogicalPlan, depth: usize) -> ExecutionResult<Relation> {
        match plan {
            LogicalPlan::Scan { table } => self.execute_scan(table, depth),

            LogicalPlan::Filter { input, predicate } => {
                let input_rel = self.execute_at(input, depth)?;
                FilterExecutor::new(predicate).execute(input_rel)
            }

            LogicalPlan::Project {
                input,
                columns,
                alias,
            } => {
                let input_rel = self.execute_at(input, depth)?;
                ProjectExecutor::new(columns, alias).execute(input_rel)
            }

            LogicalPlan::Join {
                left,
                right,
                on,
                kind,
            } => {
                let left_rel = self.execute_at(left, depth)?;
                let right_rel = self.execute_at(right, depth)?;
                if on.is_empty() {
                    return Err(ExecutionError::InvalidOperation(
                        "Join requires at least one key pair".into(),
                    ));
                }
                let mut left_keys = Vec::with_capacity(on.len());
                let mut right_keys = Vec::with_capacity(on.len());
                for (l, r) in on {
                    left_keys.push(resolve_key(l, &left_rel)?);
                    right_keys.push(resolve_key(r, &right_rel)?);
                }
                Ok(HashJoin::new(left_keys, right_keys, *kind).execute(left_rel, right_rel))
            }

            LogicalPlan::Window {
                input,
                partition_by,
                func,
                arg,
                alias,
            } => {
                let input_rel = self.execute_at(input, depth)?;
                let partition_keys = partition_by
                    .iter()
                    .map(|e| resolve_key(e, &input_rel))
                    .collect::<ExecutionResult<Vec<_>>>()?;
                let arg_idx = resolve_aggregate_arg(*func, arg, &input_rel)?;
                WindowExecutor::new(partition_keys, *func, arg_idx).execute(input_rel, alias)
            }

            LogicalPlan::Aggregate {
                input,
                group_by,
                aggregates,
                alias,
            } => {
                let input_rel = self.execute_at(input, depth)?;
                let group_keys = group_by
                    .iter()
                    .map(|e| resolve_key(e, &input_rel))
                    .collect::<ExecutionResult<Vec<_>>>()?;
                let aggs = aggregates
                    .iter()
                    .map(|(func, arg)| Ok((*func, resolve_aggregate_arg(*func, arg, &input_rel)?)))
                    .collect::<ExecutionResult<Vec<_>>>()?;
                AggregateExecutor::new(group_keys, aggs).execute(input_rel, alias)
            }

            LogicalPlan::Distinct { input } => {
                let input_rel = self.execute_at(input, depth)?;
                Ok(distinct_relation(input_rel))
            }

            LogicalPlan::Sort { input, order_by } => {
                let input_rel = self.execute_at(input, depth)?;
                let keys = order_by
                    .iter()
                    .map(|(e, order)| Ok((resolve_key(e, &input_rel)?, *order)))
                    .collect::<ExecutionResult<Vec<(usize, SortOrder)>>>()?;
                Ok(SortExecutor::new(keys).execute(input_rel))
            }
        }
    }

    fn execute_scan(&self, table: &str, depth: usize) -> ExecutionResult<Relation> {
        if let Some(view) = self.data_source.get_view(table) {
            if depth >= MAX_VIEW_DEPTH {
                return Err(ExecutionError::InvalidOperation(format!(
                    "View nesting too deep at {}",
                    table
                )));
            }
            return Ok(self.execute_at(&view, depth + 1)?.rename(table));
        }

        let rows = self.data_source.get_table_rows(table)?;
        let column_count = self.data_source.get_column_count(table)?;
        Ok(Relation::from_rows(rows, table, column_count))
    }
}

/// Resolves a plain column expression to its offset in the relation.
fn resolve_key(expr: &Expr, relation: &Relation) -> ExecutionResult<usize> {
    let col = expr.as_column().ok_or_else(|| {
        ExecutionError::InvalidOperation(format!("Expected a column reference, got {:?}", expr))
    })?;
    let not_found = || ExecutionError::ColumnNotFound {
        table: col.table.clone(),
        column: col.column.clone(),
    };

    let position = relation
        .tables()
        .iter()
        .position(|t| *t == col.table)
        .ok_or_else(not_found)?;
    if col.index >= relation.table_column_counts()[position] {
        return Err(not_found());
    }
    let offset = relation.get_table_offset(&col.table).ok_or_else(not_found)?;
    Ok(offset + col.index)
}

/// Resolves an aggregate argument. A literal argument is only meaningful for
/// `COUNT(*)`.
fn resolve_aggregate_arg(
    func: AggregateFunc,
    arg: &Expr,
    relation: &Relation,
) -> ExecutionResult<Option<usize>> {
    match (func, arg) {
        (AggregateFunc::Count, Expr::Literal(_)) => Ok(None),
        _ => resolve_key(arg, relation).map(Some),
    }
}

/// A simple in-memory data source for testing and simple use cases.
#[derive(Default)]
pub struct InMemoryDataSource {
    tables: BTreeMap<String, TableData>,
    views: BTreeMap<String, LogicalPlan>,
}

/// Data for a single table.
#[derive(Default)]
struct TableData {
    rows: Vec<Arc<Row>>,
    column_count: usize,
}

impl InMemoryDataSource {
    /// Creates a new empty in-memory data source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table with the given rows.
    pub fn add_table(&mut self, name: impl Into<String>, rows: Vec<Row>, column_count: usize) {
        self.tables.insert(
            name.into(),
            TableData {
                rows: rows.into_iter().map(Arc::new).collect(),
                column_count,
            },
        );
    }

    /// Registers a named view.
    pub fn add_view(&mut self, name: impl Into<String>, plan: LogicalPlan) {
        self.views.insert(name.into(), plan);
    }
}

impl DataSource for InMemoryDataSource {
    fn get_table_rows(&self, table: &str) -> ExecutionResult<Vec<Arc<Row>>> {
        self.tables
            .get(table)
            .map(|t| t.rows.clone())
            .ok_or_else(|| ExecutionError::TableNotFound(table.into()))
    }

    fn get_column_count(&self, table: &str) -> ExecutionResult<usize> {
        self.tables
            .get(table)
            .map(|t| t.column_count)
            .ok_or_else(|| ExecutionError::TableNotFound(table.into()))
    }

    fn get_view(&self, name: &str) -> Option<LogicalPlan> {
        self.views.get(name).cloned()
    }
}
