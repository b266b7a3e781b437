//! AST module for query expressions.

mod expr;

pub use expr::{AggregateFunc, BinaryOp, ColumnRef, Expr, SortOrder, UnaryOp};
