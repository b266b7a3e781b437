//! Cache management for shipdb.
//!
//! This module provides the `TableCache` struct which manages every table store
//! and runs constraint-checked writes across them.

use crate::constraint::ConstraintChecker;
use crate::row_store::RowStore;
use shipdb_core::schema::Table;
use shipdb_core::{Error, Result, Row, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Cache for managing multiple table stores.
pub struct TableCache {
    /// Table name → RowStore mapping.
    tables: BTreeMap<String, RowStore>,
}

impl TableCache {
    /// Creates a new empty table cache.
    pub fn new() -> Self {
        Self {
            tables: BTreeMap::new(),
        }
    }

    /// Creates a table in the cache.
    pub fn create_table(&mut self, schema: Table) -> Result<()> {
        let name = schema.name().to_string();
        if self.tables.contains_key(&name) {
            return Err(Error::invalid_schema(format!(
                "Table already exists: {}",
                name
            )));
        }
        self.tables.insert(name, RowStore::new(schema));
        Ok(())
    }

    /// Gets a reference to a table store.
    pub fn get_table(&self, name: &str) -> Option<&RowStore> {
        self.tables.get(name)
    }

    /// Gets a mutable reference to a table store.
    pub fn get_table_mut(&mut self, name: &str) -> Option<&mut RowStore> {
        self.tables.get_mut(name)
    }

    fn store(&self, name: &str) -> Result<&RowStore> {
        self.tables.get(name).ok_or_else(|| Error::table_not_found(name))
    }

    fn store_mut(&mut self, name: &str) -> Result<&mut RowStore> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| Error::table_not_found(name))
    }

    /// Returns all table names.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(|s| s.as_str()).collect()
    }

    /// Inserts a row after running every constraint check.
    ///
    /// A null auto-increment key is filled from the table sequence; the stored
    /// row is returned so callers can read the assigned key.
    pub fn insert(&mut self, table: &str, values: Vec<Value>) -> Result<Arc<Row>> {
        let mut row = Row::create(values);
        let store = self.store_mut(table)?;
        store.fill_auto_increment(&mut row);
        let schema = store.schema().clone();

        ConstraintChecker::check_row(&schema, &row)?;
        ConstraintChecker::check_foreign_keys_for_insert(self, &schema, std::slice::from_ref(&row))?;

        let store = self.store_mut(table)?;
        let row_id = store.insert(row)?;
        store
            .get(row_id)
            .ok_or_else(|| Error::invalid_operation("inserted row vanished"))
    }

    /// Replaces the row holding primary key `key`. Returns the number of rows changed.
    pub fn update_by_pk(&mut self, table: &str, key: &[Value], values: Vec<Value>) -> Result<usize> {
        let store = self.store(table)?;
        let Some(old_row) = store.get_by_pk(key) else {
            return Ok(0);
        };
        let schema = store.schema().clone();
        let new_row = Row::new(old_row.id(), values);

        ConstraintChecker::check_row(&schema, &new_row)?;
        ConstraintChecker::check_foreign_keys_for_update(
            self,
            &schema,
            &[((*old_row).clone(), new_row.clone())],
        )?;

        self.store_mut(table)?.update(old_row.id(), new_row)?;
        Ok(1)
    }

    /// Deletes the row holding primary key `key`. Returns the number of rows removed.
    pub fn delete_by_pk(&mut self, table: &str, key: &[Value]) -> Result<usize> {
        let store = self.store(table)?;
        let Some(row) = store.get_by_pk(key) else {
            return Ok(0);
        };
        let schema = store.schema().clone();

        ConstraintChecker::check_foreign_keys_for_delete(self, &schema, &[(*row).clone()])?;

        self.store_mut(table)?.delete(row.id())?;
        Ok(1)
    }
}

impl Default for TableCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipdb_core::schema::TableBuilder;
    use shipdb_core::DataType;

    fn parts() -> Table {
        TableBuilder::new("parts")
            .unwrap()
            .add_column("part_code", DataType::String)
            .unwrap()
            .add_column("name", DataType::String)
            .unwrap()
            .add_primary_key(&["part_code"], false)
            .unwrap()
            .build()
            .unwrap()
    }

    fn lines() -> Table {
        TableBuilder::new("lines")
            .unwrap()
            .add_column("line_id", DataType::Int64)
            .unwrap()
            .add_column("part_code", DataType::String)
            .unwrap()
            .add_primary_key(&["line_id"], true)
            .unwrap()
            .add_foreign_key("fk_lines_part", "part_code", "parts", "part_code")
            .unwrap()
            .build()
            .unwrap()
    }

    fn setup() -> TableCache {
        let mut cache = TableCache::new();
        cache.create_table(parts()).unwrap();
        cache.create_table(lines()).unwrap();
        cache
    }

    fn s(v: &str) -> Value {
        Value::String(v.into())
    }

    #[test]
    fn test_cache_create_duplicate_table() {
        let mut cache = setup();
        assert!(cache.create_table(parts()).is_err());
        assert_eq!(cache.table_names(), vec!["lines", "parts"]);
    }

    #[test]
    fn test_insert_assigns_auto_increment() {
        let mut cache = setup();
        cache.insert("parts", vec![s("P1"), s("Bolt")]).unwrap();
        let first = cache.insert("lines", vec![Value::Null, s("P1")]).unwrap();
        let second = cache.insert("lines", vec![Value::Null, s("P1")]).unwrap();
        assert_eq!(first.get(0), Some(&Value::Int64(1)));
        assert_eq!(second.get(0), Some(&Value::Int64(2)));
        assert_eq!(cache.get_table("lines").unwrap().len(), 2);
    }

    #[test]
    fn test_insert_rejects_duplicate_and_orphan() {
        let mut cache = setup();
        cache.insert("parts", vec![s("P1"), s("Bolt")]).unwrap();
        let dup = cache.insert("parts", vec![s("P1"), s("Nut")]).unwrap_err();
        assert!(matches!(dup, Error::UniqueConstraint { .. }));

        let orphan = cache.insert("lines", vec![Value::Null, s("P9")]).unwrap_err();
        assert!(matches!(orphan, Error::ForeignKeyViolation { .. }));
        assert_eq!(cache.get_table("lines").unwrap().len(), 0);
    }

    #[test]
    fn test_insert_unknown_table() {
        let mut cache = setup();
        assert_eq!(
            cache.insert("invoices", vec![]).unwrap_err(),
            Error::table_not_found("invoices")
        );
    }

    #[test]
    fn test_update_by_pk() {
        let mut cache = setup();
        cache.insert("parts", vec![s("P1"), s("Bolt")]).unwrap();

        assert_eq!(cache.update_by_pk("parts", &[s("P1")], vec![s("P1"), s("Screw")]).unwrap(), 1);
        assert_eq!(cache.update_by_pk("parts", &[s("P2")], vec![s("P2"), s("X")]).unwrap(), 0);

        let row = cache.get_table("parts").unwrap().get_by_pk(&[s("P1")]).unwrap();
        assert_eq!(row.get(1), Some(&s("Screw")));
    }

    #[test]
    fn test_delete_restricted_by_children() {
        let mut cache = setup();
        cache.insert("parts", vec![s("P1"), s("Bolt")]).unwrap();
        cache.insert("parts", vec![s("P2"), s("Nut")]).unwrap();
        cache.insert("lines", vec![Value::Null, s("P1")]).unwrap();

        assert!(cache.delete_by_pk("parts", &[s("P1")]).is_err());
        assert_eq!(cache.delete_by_pk("parts", &[s("P2")]).unwrap(), 1);
        assert_eq!(cache.delete_by_pk("parts", &[s("P2")]).unwrap(), 0);
        assert_eq!(cache.delete_by_pk("lines", &[Value::Int64(1)]).unwrap(), 1);
        assert_eq!(cache.delete_by_pk("parts", &[s("P1")]).unwrap(), 1);
    }
}
