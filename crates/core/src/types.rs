//! Data type definitions for shipdb.
//!
//! This module defines the column types the store can hold.

use core::fmt;

/// Supported data types in the shipdb store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Boolean (predicate results only, never stored)
    Boolean,
    /// 64-bit signed integer
    Int64,
    /// Exact decimal number (prices, quantities, percentages)
    Decimal,
    /// UTF-8 string
    String,
    /// Calendar date without time of day
    Date,
}

impl DataType {
    /// Returns the SQL-style name of this type.
    pub fn sql_name(&self) -> &'static str {
        match self {
            DataType::Boolean => "boolean",
            DataType::Int64 => "bigint",
            DataType::Decimal => "numeric",
            DataType::String => "text",
            DataType::Date => "date",
        }
    }

    /// Returns whether values of this type support arithmetic.
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Int64 | DataType::Decimal)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}
