//! Index definition for shipdb schema.

/// A column reference within an index definition.
#[derive(Clone, Debug)]
pub struct IndexedColumn {
    /// Column name.
    pub name: String,
    /// Whether this column auto-increments (only valid for primary key).
    pub auto_increment: bool,
}

impl IndexedColumn {
    /// Creates a new indexed column.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            auto_increment: false,
        }
    }

    /// Sets auto-increment flag.
    pub fn auto_increment(mut self, auto_increment: bool) -> Self {
        self.auto_increment = auto_increment;
        self
    }
}

/// An index definition in a table schema.
#[derive(Clone, Debug)]
pub struct IndexDef {
    /// Index name.
    name: String,
    /// Table name this index belongs to.
    table_name: String,
    /// Columns included in this index.
    columns: Vec<IndexedColumn>,
    /// Whether this index enforces uniqueness.
    unique: bool,
}

impl IndexDef {
    /// Creates a new index definition.
    pub fn new(
        name: impl Into<String>,
        table_name: impl Into<String>,
        columns: Vec<IndexedColumn>,
    ) -> Self {
        Self {
            name: name.into(),
            table_name: table_name.into(),
            columns,
            unique: false,
        }
    }

    /// Sets whether this index is unique.
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Returns the index name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the table name.
    #[inline]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Returns the indexed columns.
    #[inline]
    pub fn columns(&self) -> &[IndexedColumn] {
        &self.columns
    }

    /// Returns whether this index is unique.
    #[inline]
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Returns whether the (single) key column auto-increments.
    pub fn is_auto_increment(&self) -> bool {
        self.columns.len() == 1 && self.columns[0].auto_increment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_def() {
        let idx = IndexDef::new(
            "pkShipments",
            "shipments",
            vec![
                IndexedColumn::new("warehouse_no"),
                IndexedColumn::new("shipment_doc_no"),
            ],
        )
        .unique(true);

        assert_eq!(idx.name(), "pkShipments");
        assert_eq!(idx.table_name(), "shipments");
        assert_eq!(idx.columns().len(), 2);
        assert!(idx.is_unique());
        assert!(!idx.is_auto_increment());
    }

    #[test]
    fn test_auto_increment_single_column() {
        let idx = IndexDef::new(
            "pkCustomers",
            "customers",
            vec![IndexedColumn::new("customer_id").auto_increment(true)],
        );
        assert!(idx.is_auto_increment());
    }
}
