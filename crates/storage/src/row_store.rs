//! Row storage for shipdb.
//!
//! This module provides the `RowStore` struct which manages rows for a single table,
//! including primary key, secondary index and auto-increment maintenance.

use shipdb_core::schema::Table;
use shipdb_core::{Error, Result, Row, RowId, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Rows keyed by id; scans follow insertion order.
type RowMap = BTreeMap<RowId, Arc<Row>>;

/// Composite index key: one value per indexed column, in index order.
pub type IndexKey = Vec<Value>;

/// Ordered multi-map from key to row IDs.
#[derive(Debug, Default)]
pub struct BTreeIndexStore {
    entries: BTreeMap<IndexKey, BTreeSet<RowId>>,
    unique: bool,
}

impl BTreeIndexStore {
    /// Creates a new BTree index store.
    pub fn new(unique: bool) -> Self {
        Self {
            entries: BTreeMap::new(),
            unique,
        }
    }

    /// Adds a key-value pair. Fails with the key on a unique index when it is taken.
    pub fn add(&mut self, key: IndexKey, row_id: RowId) -> std::result::Result<(), IndexKey> {
        if self.unique {
            if let Some(ids) = self.entries.get(&key) {
                if !ids.is_empty() && !ids.contains(&row_id) {
                    return Err(key);
                }
            }
        }
        self.entries.entry(key).or_default().insert(row_id);
        Ok(())
    }

    /// Gets all row IDs for a key.
    pub fn get(&self, key: &[Value]) -> Vec<RowId> {
        self.entries
            .get(key)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Removes a key-value pair.
    pub fn remove(&mut self, key: &[Value], row_id: RowId) {
        if let Some(ids) = self.entries.get_mut(key) {
            ids.remove(&row_id);
            if ids.is_empty() {
                self.entries.remove(key);
            }
        }
    }

    /// Checks if the index contains a key.
    pub fn contains_key(&self, key: &[Value]) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns whether this is a unique index.
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Returns the number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns all row IDs in key order.
    pub fn get_all(&self) -> Vec<RowId> {
        self.entries.values().flatten().copied().collect()
    }
}

/// Extracts the key from a row for the given column indices.
fn extract_key(row: &Row, col_indices: &[usize]) -> IndexKey {
    col_indices
        .iter()
        .map(|&i| row.get(i).cloned().unwrap_or(Value::Null))
        .collect()
}

/// Row storage for a single table.
pub struct RowStore {
    schema: Table,
    rows: RowMap,
    primary_index: Option<BTreeIndexStore>,
    pk_columns: Vec<usize>,
    secondary_indices: BTreeMap<String, BTreeIndexStore>,
    index_columns: BTreeMap<String, Vec<usize>>,
    /// Column fed by the auto-increment sequence, if any.
    auto_increment: Option<usize>,
    next_sequence: i64,
}

impl RowStore {
    /// Creates a new row store for the given table schema.
    pub fn new(schema: Table) -> Self {
        let mut store = Self {
            schema: schema.clone(),
            rows: RowMap::default(),
            primary_index: None,
            pk_columns: Vec::new(),
            secondary_indices: BTreeMap::new(),
            index_columns: BTreeMap::new(),
            auto_increment: None,
            next_sequence: 1,
        };

        if let Some(pk) = schema.primary_key() {
            store.primary_index = Some(BTreeIndexStore::new(true));
            store.pk_columns = schema.primary_key_positions();
            if pk.is_auto_increment() {
                store.auto_increment = store.pk_columns.first().copied();
            }
        }

        for idx in schema.indices() {
            if Some(idx.name()) == schema.primary_key().map(|pk| pk.name()) {
                continue;
            }
            let cols: Vec<usize> = idx
                .columns()
                .iter()
                .filter_map(|c| schema.get_column_index(&c.name))
                .collect();
            store.secondary_indices.insert(
                idx.name().to_string(),
                BTreeIndexStore::new(idx.is_unique()),
            );
            store.index_columns.insert(idx.name().to_string(), cols);
        }

        store
    }

    /// Returns the table schema.
    pub fn schema(&self) -> &Table {
        &self.schema
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Fills a null auto-increment column from the table sequence.
    ///
    /// Returns the assigned value. Explicit values advance the sequence past them
    /// so later generated keys never collide.
    pub fn fill_auto_increment(&mut self, row: &mut Row) -> Option<i64> {
        let col = self.auto_increment?;
        match row.get(col).cloned() {
            Some(Value::Null) => {
                let next = self.next_sequence;
                self.next_sequence += 1;
                row.set(col, Value::Int64(next));
                Some(next)
            }
            Some(Value::Int64(explicit)) => {
                self.next_sequence = self.next_sequence.max(explicit + 1);
                Some(explicit)
            }
            _ => None,
        }
    }

    /// Inserts a row into the store.
    pub fn insert(&mut self, row: Row) -> Result<RowId> {
        let row_id = row.id();

        if self.rows.contains_key(&row_id) {
            return Err(Error::invalid_operation("Row ID already exists"));
        }

        if let Some(ref mut pk_index) = self.primary_index {
            let pk = extract_key(&row, &self.pk_columns);
            if let Err(key) = pk_index.add(pk, row_id) {
                return Err(self.duplicate_pk(key));
            }
        }

        let index_names: Vec<String> = self.index_columns.keys().cloned().collect();
        for idx_name in &index_names {
            let key = extract_key(&row, &self.index_columns[idx_name]);
            if let Some(idx) = self.secondary_indices.get_mut(idx_name) {
                if idx.add(key.clone(), row_id).is_err() {
                    self.rollback_insert(row_id, &row);
                    return Err(Error::unique_constraint(idx_name.clone(), key_value(key)));
                }
            }
        }

        self.rows.insert(row_id, Arc::new(row));
        Ok(row_id)
    }

    fn duplicate_pk(&self, key: IndexKey) -> Error {
        let column = self
            .schema
            .primary_key()
            .map(|pk| pk.name().to_string())
            .unwrap_or_else(|| "primary_key".into());
        Error::unique_constraint(column, key_value(key))
    }

    fn rollback_insert(&mut self, row_id: RowId, row: &Row) {
        if let Some(ref mut pk_index) = self.primary_index {
            pk_index.remove(&extract_key(row, &self.pk_columns), row_id);
        }
        for (idx_name, cols) in &self.index_columns {
            if let Some(idx) = self.secondary_indices.get_mut(idx_name) {
                idx.remove(&extract_key(row, cols), row_id);
            }
        }
    }

    /// Updates a row in the store.
    pub fn update(&mut self, row_id: RowId, new_row: Row) -> Result<()> {
        let old_row = self
            .rows
            .get(&row_id)
            .cloned()
            .ok_or_else(|| Error::not_found(self.schema.name(), Value::Int64(row_id as i64)))?;

        let old_pk = extract_key(&old_row, &self.pk_columns);
        let new_pk = extract_key(&new_row, &self.pk_columns);
        if let Some(ref pk_index) = self.primary_index {
            if old_pk != new_pk && pk_index.contains_key(&new_pk) {
                return Err(self.duplicate_pk(new_pk));
            }
        }

        for (idx_name, cols) in &self.index_columns {
            let old_key = extract_key(&old_row, cols);
            let new_key = extract_key(&new_row, cols);
            if let Some(idx) = self.secondary_indices.get(idx_name) {
                if idx.is_unique() && old_key != new_key && idx.contains_key(&new_key) {
                    return Err(Error::unique_constraint(idx_name.clone(), key_value(new_key)));
                }
            }
        }

        if let Some(ref mut pk_index) = self.primary_index {
            if old_pk != new_pk {
                pk_index.remove(&old_pk, row_id);
                let _ = pk_index.add(new_pk, row_id);
            }
        }

        for (idx_name, cols) in &self.index_columns {
            let old_key = extract_key(&old_row, cols);
            let new_key = extract_key(&new_row, cols);
            if let Some(idx) = self.secondary_indices.get_mut(idx_name) {
                if old_key != new_key {
                    idx.remove(&old_key, row_id);
                    let _ = idx.add(new_key, row_id);
                }
            }
        }

        self.rows.insert(row_id, Arc::new(new_row));
        Ok(())
    }

    /// Deletes a row from the store.
    pub fn delete(&mut self, row_id: RowId) -> Result<Arc<Row>> {
        let row = self
            .rows
            .remove(&row_id)
            .ok_or_else(|| Error::not_found(self.schema.name(), Value::Int64(row_id as i64)))?;
        self.rollback_insert(row_id, &row);
        Ok(row)
    }

    /// Gets a row by ID.
    pub fn get(&self, row_id: RowId) -> Option<Arc<Row>> {
        self.rows.get(&row_id).cloned()
    }

    /// Returns an iterator over all rows in storage order.
    pub fn scan(&self) -> impl Iterator<Item = Arc<Row>> + '_ {
        self.rows.values().cloned()
    }

    /// Returns all rows ordered by primary key.
    ///
    /// Tables without a primary key fall back to storage order.
    pub fn scan_by_pk(&self) -> Vec<Arc<Row>> {
        match self.primary_index {
            Some(ref pk_index) => pk_index
                .get_all()
                .iter()
                .filter_map(|id| self.rows.get(id).cloned())
                .collect(),
            None => self.scan().collect(),
        }
    }

    /// Gets the row holding a primary key value.
    pub fn get_by_pk(&self, pk_value: &[Value]) -> Option<Arc<Row>> {
        let pk_index = self.primary_index.as_ref()?;
        pk_index
            .get(pk_value)
            .first()
            .and_then(|id| self.rows.get(id).cloned())
    }

    /// Finds existing row ID by the primary key of `row`.
    pub fn find_row_id_by_pk(&self, row: &Row) -> Option<RowId> {
        let pk_index = self.primary_index.as_ref()?;
        pk_index
            .get(&extract_key(row, &self.pk_columns))
            .first()
            .copied()
    }

    /// Checks if a primary key value exists.
    pub fn pk_exists(&self, pk_value: &[Value]) -> bool {
        self.primary_index
            .as_ref()
            .is_some_and(|idx| idx.contains_key(pk_value))
    }

    /// Gets rows by exact key on a secondary index.
    pub fn index_get(&self, index_name: &str, key: &[Value]) -> Vec<Arc<Row>> {
        match self.secondary_indices.get(index_name) {
            Some(idx) => idx
                .get(key)
                .iter()
                .filter_map(|id| self.rows.get(id).cloned())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Returns true if any row holds `value` in column `col`.
    ///
    /// Uses the primary key or a single-column secondary index when one covers
    /// the column, otherwise scans.
    pub fn contains_value(&self, col: usize, value: &Value) -> bool {
        let key = [value.clone()];
        if self.pk_columns == [col] {
            return self.pk_exists(&key);
        }
        let covering = self
            .index_columns
            .iter()
            .find(|(_, cols)| cols.as_slice() == [col]);
        match covering {
            Some((name, _)) => self
                .secondary_indices
                .get(name)
                .is_some_and(|idx| idx.contains_key(&key)),
            None => self.scan().any(|row| row.get(col) == Some(value)),
        }
    }

    /// Gets the primary key column indices.
    pub fn pk_columns(&self) -> &[usize] {
        &self.pk_columns
    }

    /// Extracts the primary key value from a row.
    pub fn extract_pk(&self, row: &Row) -> Option<IndexKey> {
        if self.pk_columns.is_empty() {
            None
        } else {
            Some(extract_key(row, &self.pk_columns))
        }
    }
}

/// Collapses a key into a single reportable value.
fn key_value(mut key: IndexKey) -> Value {
    if key.len() == 1 {
        key.remove(0)
    } else {
        let parts: Vec<String> = key.iter().map(|v| v.to_string()).collect();
        Value::String(format!("({})", parts.join(", ")))
    }
}
