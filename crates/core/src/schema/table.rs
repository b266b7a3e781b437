//! Table definition for shipdb schema.

use super::column::Column;
use super::constraint::{Check, Constraints, ForeignKey};
use super::index::{IndexDef, IndexedColumn};
use crate::error::{Error, Result};
use crate::types::DataType;

/// A table definition in the store schema.
#[derive(Clone, Debug)]
pub struct Table {
    /// Table name.
    name: String,
    /// Column definitions.
    columns: Vec<Column>,
    /// Index definitions, primary key included.
    indices: Vec<IndexDef>,
    /// Table constraints.
    constraints: Constraints,
}

impl Table {
    /// Creates a new unconstrained table with the given name and columns.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        let columns: Vec<Column> = columns
            .into_iter()
            .enumerate()
            .map(|(i, c)| c.with_index(i))
            .collect();

        Self {
            name: name.into(),
            columns,
            indices: Vec::new(),
            constraints: Constraints::new(),
        }
    }

    /// Returns the table name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the columns.
    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the indices.
    #[inline]
    pub fn indices(&self) -> &[IndexDef] {
        &self.indices
    }

    /// Returns the constraints.
    #[inline]
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Gets a column by name.
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Gets a column index by name.
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    /// Gets an index by name.
    pub fn get_index(&self, name: &str) -> Option<&IndexDef> {
        self.indices.iter().find(|i| i.name() == name)
    }

    /// Returns the primary key index if defined.
    pub fn primary_key(&self) -> Option<&IndexDef> {
        self.constraints.get_primary_key()
    }

    /// Returns the column positions that make up the primary key, in key order.
    pub fn primary_key_positions(&self) -> Vec<usize> {
        self.primary_key()
            .map(|pk| {
                pk.columns()
                    .iter()
                    .filter_map(|c| self.get_column_index(&c.name))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Builder for creating table definitions.
pub struct TableBuilder {
    name: String,
    columns: Vec<Column>,
    indices: Vec<IndexDef>,
    pk_name: Option<String>,
    pk_columns: Vec<IndexedColumn>,
    unique_columns: Vec<String>,
    foreign_keys: Vec<ForeignKey>,
    checks: Vec<(String, Check)>,
}

impl TableBuilder {
    /// Creates a new table builder.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        Self::check_naming_rules(&name)?;
        Ok(Self {
            name,
            columns: Vec::new(),
            indices: Vec::new(),
            pk_name: None,
            pk_columns: Vec::new(),
            unique_columns: Vec::new(),
            foreign_keys: Vec::new(),
            checks: Vec::new(),
        })
    }

    /// Validates a name follows naming rules.
    fn check_naming_rules(name: &str) -> Result<()> {
        let Some(first) = name.chars().next() else {
            return Err(Error::invalid_schema("Name cannot be empty"));
        };
        if !first.is_ascii_alphabetic() && first != '_' {
            return Err(Error::invalid_schema(format!(
                "Name must start with letter or underscore: {}",
                name
            )));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::invalid_schema(format!(
                "Name contains invalid characters: {}",
                name
            )));
        }
        Ok(())
    }

    fn require_column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| Error::invalid_schema(format!("Column not found: {}", name)))
    }

    /// Adds a column to the table.
    pub fn add_column(mut self, name: impl Into<String>, data_type: DataType) -> Result<Self> {
        let name = name.into();
        Self::check_naming_rules(&name)?;
        if self.columns.iter().any(|c| c.name() == name) {
            return Err(Error::invalid_schema(format!(
                "Column already exists: {}",
                name
            )));
        }
        self.columns.push(Column::new(name, data_type));
        Ok(self)
    }

    /// Marks columns as nullable.
    pub fn add_nullable(mut self, columns: &[&str]) -> Self {
        for name in columns {
            if let Some(col) = self.columns.iter_mut().find(|c| c.name() == *name) {
                *col = col.clone().nullable(true);
            }
        }
        self
    }

    /// Sets the primary key. Auto-increment only applies to a single integer column.
    pub fn add_primary_key(mut self, columns: &[&str], auto_increment: bool) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::invalid_schema("Primary key needs at least one column"));
        }
        let pk_name = format!("pk{}", capitalize(&self.name));

        let indexed_cols: Vec<IndexedColumn> = columns
            .iter()
            .map(|name| {
                IndexedColumn::new(*name).auto_increment(auto_increment && columns.len() == 1)
            })
            .collect();

        for col in &indexed_cols {
            let column = self.require_column(&col.name)?;
            if col.auto_increment && column.data_type() != DataType::Int64 {
                return Err(Error::invalid_schema("Auto-increment requires integer type"));
            }
        }

        if columns.len() == 1 {
            self.unique_columns.push(columns[0].to_string());
        }

        self.pk_name = Some(pk_name);
        self.pk_columns = indexed_cols;
        Ok(self)
    }

    /// Adds a secondary index.
    pub fn add_index(
        mut self,
        name: impl Into<String>,
        columns: &[&str],
        unique: bool,
    ) -> Result<Self> {
        let name = name.into();
        Self::check_naming_rules(&name)?;

        let indexed_cols: Vec<IndexedColumn> =
            columns.iter().map(|n| IndexedColumn::new(*n)).collect();
        for col in &indexed_cols {
            self.require_column(&col.name)?;
        }

        if unique && columns.len() == 1 {
            self.unique_columns.push(columns[0].to_string());
        }

        self.indices
            .push(IndexDef::new(name, &self.name, indexed_cols).unique(unique));
        Ok(self)
    }

    /// Adds a foreign key constraint and an index on the child column.
    pub fn add_foreign_key(
        mut self,
        name: impl Into<String>,
        child_column: &str,
        parent_table: &str,
        parent_column: &str,
    ) -> Result<Self> {
        let name = name.into();
        Self::check_naming_rules(&name)?;
        self.require_column(child_column)?;

        let fk = ForeignKey::new(&name, &self.name, child_column, parent_table, parent_column);
        self.foreign_keys.push(fk);

        let is_unique = self.unique_columns.iter().any(|c| c == child_column);
        self = self.add_index(&name, &[child_column], is_unique)?;
        Ok(self)
    }

    /// Requires a numeric column to hold values >= 0.
    pub fn add_non_negative(mut self, column: &str) -> Result<Self> {
        let col = self.require_column(column)?;
        if !col.data_type().is_numeric() {
            return Err(Error::invalid_schema(format!(
                "Check requires numeric column: {}",
                column
            )));
        }
        self.checks.push((column.to_string(), Check::NonNegative));
        Ok(self)
    }

    /// Builds the table definition.
    pub fn build(self) -> Result<Table> {
        let mut constraints = Constraints::new();
        let mut all_indices = self.indices;

        if let Some(pk_name) = &self.pk_name {
            let pk = IndexDef::new(pk_name, &self.name, self.pk_columns.clone()).unique(true);
            all_indices.push(pk.clone());
            constraints = constraints.primary_key(pk);
        }

        let not_nullable: Vec<String> = self
            .columns
            .iter()
            .filter(|c| !c.is_nullable())
            .map(|c| c.name().to_string())
            .collect();
        constraints = constraints.not_nullable(not_nullable);

        for fk in self.foreign_keys {
            constraints = constraints.add_foreign_key(fk);
        }
        for (column, check) in self.checks {
            constraints = constraints.add_check(column, check);
        }

        let unique_columns = self.unique_columns;
        let columns: Vec<Column> = self
            .columns
            .into_iter()
            .enumerate()
            .map(|(i, c)| {
                let is_unique = unique_columns.iter().any(|u| u == c.name());
                c.unique(is_unique).with_index(i)
            })
            .collect();

        Ok(Table {
            name: self.name,
            columns,
            indices: all_indices,
            constraints,
        })
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().chain(chars).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shipments() -> Table {
        TableBuilder::new("shipments")
            .unwrap()
            .add_column("warehouse_no", DataType::Int64)
            .unwrap()
            .add_column("shipment_doc_no", DataType::Int64)
            .unwrap()
            .add_column("customer_id", DataType::Int64)
            .unwrap()
            .add_column("qty", DataType::Decimal)
            .unwrap()
            .add_primary_key(&["warehouse_no", "shipment_doc_no"], false)
            .unwrap()
            .add_foreign_key("fk_customer", "customer_id", "customers", "customer_id")
            .unwrap()
            .add_non_negative("qty")
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_table_builder() {
        let table = shipments();
        assert_eq!(table.name(), "shipments");
        assert_eq!(table.columns().len(), 4);
        assert!(table.primary_key().is_some());
        assert_eq!(table.primary_key_positions(), vec![0, 1]);
        assert_eq!(table.constraints().get_foreign_keys().len(), 1);
        assert_eq!(table.constraints().get_checks().len(), 1);
    }

    #[test]
    fn test_primary_key_in_indices() {
        let table = shipments();
        assert!(table.get_index("pkShipments").is_some());
        assert!(table.get_index("fk_customer").is_some());
    }

    #[test]
    fn test_table_get_column() {
        let table = shipments();
        assert_eq!(table.get_column_index("customer_id"), Some(2));
        assert!(table.get_column("qty").is_some());
        assert!(table.get_column("unknown").is_none());
    }

    #[test]
    fn test_invalid_column_name() {
        let result = TableBuilder::new("test")
            .unwrap()
            .add_column("123invalid", DataType::Int64);
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_column() {
        let result = TableBuilder::new("test")
            .unwrap()
            .add_column("id", DataType::Int64)
            .unwrap()
            .add_column("id", DataType::Int64);
        assert!(result.is_err());
    }

    #[test]
    fn test_auto_increment_requires_integer() {
        let result = TableBuilder::new("parts")
            .unwrap()
            .add_column("part_code", DataType::String)
            .unwrap()
            .add_primary_key(&["part_code"], true);
        assert!(result.is_err());
    }

    #[test]
    fn test_non_negative_requires_numeric() {
        let result = TableBuilder::new("parts")
            .unwrap()
            .add_column("name", DataType::String)
            .unwrap()
            .add_non_negative("name");
        assert!(result.is_err());
    }
}
