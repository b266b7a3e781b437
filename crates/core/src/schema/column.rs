//! Typed columns of the parts, customers and shipments tables.

use crate::types::DataType;

/// One column of a table, e.g. `shipments.qty DECIMAL NOT NULL`.
///
/// Columns are `NOT NULL` unless marked otherwise. The position is assigned
/// by [`TableBuilder`](super::TableBuilder) and matches the order in which
/// the table's row values are stored.
#[derive(Clone, Debug)]
pub struct Column {
    name: String,
    data_type: DataType,
    nullable: bool,
    /// Backed by a unique index, like `customers.customer_id`.
    unique: bool,
    /// Position within the row values.
    index: usize,
}

impl Column {
    /// A `NOT NULL` column at position 0.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: false,
            unique: false,
            index: 0,
        }
    }

    /// Allows or forbids NULL in this column.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Marks the column as a unique key.
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub(crate) fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// True if a row may hold NULL here.
    #[inline]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    #[inline]
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Position of the column within a stored row.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Two columns are the same when name and type agree; flags and position are
/// not compared.
impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.data_type == other.data_type
    }
}
