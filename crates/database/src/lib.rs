//! shipdb Database - parts, customers and shipments over the shipdb store.
//!
//! This crate provides the data access layer of the shipment service:
//! typed CRUD over the three base tables, the full shipment view and a set of
//! analytical queries, each available as a declarative plan and as a
//! record traversal that must agree with it.
//!
//! # Core Components
//!
//! - `Database`: Store handle with the table cache, views and read counter
//! - `Repository`: Entry points called by the transport layer
//! - `Config`: Store URL and query parameters, read from `SHIPDB_*` variables
//! - `RequestContext`: Per-request cancellation flag and clock
//!
//! # Example
//!
//! ```
//! use shipdb_database::{Config, NewCustomer, Repository, RequestContext};
//!
//! let repo = Repository::connect(Config::default()).unwrap();
//! let ctx = RequestContext::new();
//!
//! let customer = repo
//!     .create_customer(&ctx, &NewCustomer {
//!         name: "ООО Ромашка".into(),
//!         address: "ул. Баумана, 1".into(),
//!         city: "Казань".into(),
//!     })
//!     .unwrap();
//! assert_eq!(customer.customer_id, 1);
//!
//! let summary = repo.customer_summary(&ctx, customer.customer_id).unwrap();
//! assert!(summary.total_qty.is_zero());
//! ```

pub mod config;
pub mod context;
pub mod convert;
pub mod database;
pub mod domain;
pub mod error;
pub mod query_engine;
pub mod repository;
pub mod schema;

pub use config::Config;
pub use context::RequestContext;
pub use database::Database;
pub use domain::{
    CityShipment, Customer, CustomerSummary, FullShipmentInfo, NewCustomer, Part, PartShare,
    QualifiedCustomer, Shipment,
};
pub use error::{Error, ErrorCategory, Result};
pub use repository::{Repository, TableName, TableRow};
