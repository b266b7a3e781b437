//! shipdb Storage - Storage layer for the shipdb relational store.
//!
//! This crate provides the storage layer including:
//!
//! - `RowStore`: Row storage with primary key, index and sequence maintenance
//! - `TableCache`: Multi-table cache with constraint-checked writes
//! - `ConstraintChecker`: Constraint validation
//!
//! # Example
//!
//! ```rust
//! use shipdb_storage::TableCache;
//! use shipdb_core::schema::TableBuilder;
//! use shipdb_core::{DataType, Value};
//!
//! let mut cache = TableCache::new();
//! let schema = TableBuilder::new("customers")
//!     .unwrap()
//!     .add_column("customer_id", DataType::Int64)
//!     .unwrap()
//!     .add_column("name", DataType::String)
//!     .unwrap()
//!     .add_primary_key(&["customer_id"], true)
//!     .unwrap()
//!     .build()
//!     .unwrap();
//! cache.create_table(schema).unwrap();
//!
//! let row = cache
//!     .insert("customers", vec![Value::Null, Value::String("Alice".into())])
//!     .unwrap();
//!
//! assert_eq!(row.get(0), Some(&Value::Int64(1)));
//! assert_eq!(cache.get_table("customers").unwrap().len(), 1);
//! ```

pub mod cache;
pub mod constraint;
pub mod row_store;

pub use cache::TableCache;
pub use constraint::ConstraintChecker;
pub use row_store::{BTreeIndexStore, IndexKey, RowStore};
