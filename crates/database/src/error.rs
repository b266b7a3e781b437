//! Application error type.

use shipdb_query::executor::ExecutionError;
use thiserror::Error as ThisError;

/// Result type alias for repository operations.
pub type Result<T> = core::result::Result<T, Error>;

/// The four error classes a caller can act on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The store could not be reached or opened.
    Connectivity,
    /// The store rejected a write (duplicate key, missing referenced row, ...).
    Constraint,
    /// The request was rejected before touching the store.
    InvalidInput,
    /// Anything else, including cancelled requests.
    Internal,
}

/// Errors surfaced by the database layer.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Unsupported or unreachable store URL.
    #[error("cannot connect to {url}: {reason}")]
    Connection { url: String, reason: String },
    /// Table name outside the projection allow-list.
    #[error("unknown table: {0}")]
    UnknownTable(String),
    /// Malformed request or configuration value.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The request was cancelled before the next store read.
    #[error("request cancelled")]
    Cancelled,
    /// Error raised by the store, carried unchanged.
    #[error(transparent)]
    Store(#[from] shipdb_core::Error),
    /// A quantity or value total left the decimal range.
    #[error("numeric overflow in {0}")]
    NumericOverflow(String),
    /// Error raised while executing a query plan.
    #[error("query failed: {0}")]
    Query(ExecutionError),
}

impl From<ExecutionError> for Error {
    fn from(err: ExecutionError) -> Self {
        match err {
            ExecutionError::NumericOverflow(what) => Error::NumericOverflow(what),
            other => Error::Query(other),
        }
    }
}

impl Error {
    /// Creates a connection error.
    pub fn connection(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Connection {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Classifies the error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Connection { .. } => ErrorCategory::Connectivity,
            Error::UnknownTable(_) | Error::InvalidInput(_) => ErrorCategory::InvalidInput,
            Error::Store(e) if e.is_constraint_violation() => ErrorCategory::Constraint,
            Error::Store(_) | Error::Query(_) | Error::NumericOverflow(_) | Error::Cancelled => {
                ErrorCategory::Internal
            }
        }
    }
}
