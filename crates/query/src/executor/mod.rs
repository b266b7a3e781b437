//! Query executor module.

mod aggregate;
mod distinct;
pub mod eval;
mod filter;
pub mod join;
mod project;
mod relation;
mod runner;
mod sort;
mod window;

pub use aggregate::AggregateExecutor;
pub use distinct::distinct_relation;
pub use eval::EvalContext;
pub use filter::{filter_relation, FilterExecutor};
pub use join::HashJoin;
pub use project::{project_relation, ProjectExecutor};
pub use relation::{Relation, RelationEntry};
pub use runner::{DataSource, ExecutionError, ExecutionResult, InMemoryDataSource, PlanRunner};
pub use sort::SortExecutor;
pub use window::WindowExecutor;
