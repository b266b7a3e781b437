//! Query planner module.

mod logical;

pub use logical::{JoinKind, LogicalPlan};
