//! Schema module for shipdb.
//!
//! This module contains all schema-related definitions including columns, tables,
//! indices, and constraints.

mod column;
mod constraint;
mod index;
mod table;

pub use column::Column;
pub use constraint::{Check, ConstraintAction, Constraints, ForeignKey};
pub use index::{IndexDef, IndexedColumn};
pub use table::{Table, TableBuilder};
