//! shipdb Query - Query engine for the shipdb relational store.
//!
//! This crate provides the query execution engine including:
//!
//! - `ast`: Expression AST definitions
//! - `planner`: Logical query plans
//! - `executor`: Query execution operators (filter, project, join, window,
//!   aggregate, distinct, sort) and the plan runner
//!
//! Plans are built directly with the `LogicalPlan` constructors and executed by
//! a [`executor::PlanRunner`] over any [`executor::DataSource`]:
//!
//! ```
//! use shipdb_core::{Row, Value};
//! use shipdb_query::ast::Expr;
//! use shipdb_query::executor::{InMemoryDataSource, PlanRunner};
//! use shipdb_query::planner::LogicalPlan;
//!
//! let mut ds = InMemoryDataSource::new();
//! ds.add_table("customers", vec![
//!     Row::new(1, vec![Value::Int64(1), Value::from("Kazan")]),
//!     Row::new(2, vec![Value::Int64(2), Value::from("Moscow")]),
//! ], 2);
//!
//! let plan = LogicalPlan::filter(
//!     LogicalPlan::scan("customers"),
//!     Expr::eq(Expr::column("customers", "city", 1), Expr::literal("Kazan")),
//! );
//! let result = PlanRunner::new(&ds).execute(&plan).unwrap();
//! assert_eq!(result.len(), 1);
//! ```

pub mod ast;
pub mod executor;
pub mod planner;
