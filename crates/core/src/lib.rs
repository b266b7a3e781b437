//! shipdb Core - Core types and schema definitions for the shipdb relational store.
//!
//! This crate provides the foundational types shared by every layer:
//!
//! - `DataType`: Supported column types (Int64, Decimal, String, Date) plus Boolean for predicates
//! - `Value`: Runtime values that can be stored in a cell
//! - `Row`: A row of values with a unique identifier
//! - `schema`: Schema definitions (Column, Table, Index, Constraints)
//! - `Error`: Error types for store operations
//!
//! # Example
//!
//! ```rust
//! use shipdb_core::{DataType, Value, Row};
//! use shipdb_core::schema::TableBuilder;
//!
//! let table = TableBuilder::new("customers")
//!     .unwrap()
//!     .add_column("customer_id", DataType::Int64)
//!     .unwrap()
//!     .add_column("name", DataType::String)
//!     .unwrap()
//!     .add_primary_key(&["customer_id"], true)
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let row = Row::new(1, vec![Value::Int64(1), Value::String("Alice".into())]);
//!
//! assert_eq!(table.columns().len(), 2);
//! assert_eq!(row.get(1), Some(&Value::String("Alice".into())));
//! ```

mod error;
mod row;
pub mod schema;
mod types;
mod value;

pub use error::{Error, Result};
pub use row::{next_row_id, Row, RowId, DUMMY_ROW_ID};
pub use types::DataType;
pub use value::Value;

pub use rust_decimal::Decimal;
pub use time::Date;
