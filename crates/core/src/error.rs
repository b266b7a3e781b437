//! Error types for shipdb.

use crate::types::DataType;
use crate::value::Value;
use thiserror::Error as ThisError;

/// Result type alias for store operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for store operations.
#[derive(Clone, Debug, PartialEq, ThisError)]
pub enum Error {
    /// Type mismatch error.
    #[error("type mismatch on column {column}: expected {expected}, got {got}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        got: DataType,
    },
    /// Null constraint violation.
    #[error("null constraint violation on column: {column}")]
    NullConstraint { column: String },
    /// Unique constraint violation (duplicate key).
    #[error("duplicate key on {column}: {value}")]
    UniqueConstraint { column: String, value: Value },
    /// Check constraint violation.
    #[error("check constraint violation on column {column}: {message}")]
    CheckConstraint { column: String, message: String },
    /// Foreign key constraint violation.
    #[error("foreign key violation ({constraint}): {message}")]
    ForeignKeyViolation { constraint: String, message: String },
    /// Row or record not found.
    #[error("not found in table {table}: {key}")]
    NotFound { table: String, key: Value },
    /// Invalid schema definition.
    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },
    /// Column not found.
    #[error("column {column} not found in table {table}")]
    ColumnNotFound { table: String, column: String },
    /// Table not found.
    #[error("table not found: {name}")]
    TableNotFound { name: String },
    /// Invalid operation.
    #[error("invalid operation: {message}")]
    InvalidOperation { message: String },
}

impl Error {
    /// Creates a type mismatch error.
    pub fn type_mismatch(column: impl Into<String>, expected: DataType, got: DataType) -> Self {
        Error::TypeMismatch {
            column: column.into(),
            expected,
            got,
        }
    }

    /// Creates a null constraint error.
    pub fn null_constraint(column: impl Into<String>) -> Self {
        Error::NullConstraint {
            column: column.into(),
        }
    }

    /// Creates a unique constraint error.
    pub fn unique_constraint(column: impl Into<String>, value: Value) -> Self {
        Error::UniqueConstraint {
            column: column.into(),
            value,
        }
    }

    /// Creates a check constraint error.
    pub fn check_constraint(column: impl Into<String>, message: impl Into<String>) -> Self {
        Error::CheckConstraint {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(table: impl Into<String>, key: Value) -> Self {
        Error::NotFound {
            table: table.into(),
            key,
        }
    }

    /// Creates an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Error::InvalidSchema {
            message: message.into(),
        }
    }

    /// Creates a column not found error.
    pub fn column_not_found(table: impl Into<String>, column: impl Into<String>) -> Self {
        Error::ColumnNotFound {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Creates a table not found error.
    pub fn table_not_found(name: impl Into<String>) -> Self {
        Error::TableNotFound { name: name.into() }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Error::InvalidOperation {
            message: message.into(),
        }
    }

    /// Returns true if this error is a data integrity violation raised by the store.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            Error::TypeMismatch { .. }
                | Error::NullConstraint { .. }
                | Error::UniqueConstraint { .. }
                | Error::CheckConstraint { .. }
                | Error::ForeignKeyViolation { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::type_mismatch("qty", DataType::Decimal, DataType::String);
        assert_eq!(
            err.to_string(),
            "type mismatch on column qty: expected numeric, got text"
        );

        let err = Error::null_constraint("name");
        assert!(err.to_string().contains("name"));

        let err = Error::table_not_found("invoices");
        assert!(err.to_string().contains("invoices"));
    }

    #[test]
    fn test_error_constructors() {
        let err = Error::unique_constraint("part_code", Value::String("P1".into()));
        match err {
            Error::UniqueConstraint { column, .. } => assert_eq!(column, "part_code"),
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn test_constraint_classification() {
        assert!(Error::unique_constraint("pk", Value::Int64(1)).is_constraint_violation());
        assert!(Error::check_constraint("qty", "negative").is_constraint_violation());
        assert!(!Error::table_not_found("x").is_constraint_violation());
        assert!(!Error::invalid_operation("x").is_constraint_violation());
    }
}
