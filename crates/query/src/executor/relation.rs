//! Relation and RelationEntry types for query execution.

use shipdb_core::{Row, RowId, Value};
use std::sync::Arc;

/// A relation entry wraps one (possibly joined or derived) row.
#[derive(Clone, Debug)]
pub struct RelationEntry {
    /// The underlying row (reference counted for efficient sharing).
    pub row: Arc<Row>,
}

impl RelationEntry {
    /// Creates a relation entry over a stored row.
    #[inline]
    pub fn new(row: Arc<Row>) -> Self {
        Self { row }
    }

    /// Creates a relation entry from derived values.
    pub fn from_values(values: Vec<Value>) -> Self {
        Self {
            row: Arc::new(Row::dummy(values)),
        }
    }

    /// Returns the row ID.
    pub fn id(&self) -> RowId {
        self.row.id()
    }

    /// Gets a field value by column index.
    #[inline]
    pub fn get_field(&self, index: usize) -> Option<&Value> {
        self.row.get(index)
    }

    /// Returns every value of the row.
    #[inline]
    pub fn values(&self) -> &[Value] {
        self.row.values()
    }

    /// Concatenates two entries into a joined entry.
    pub fn combine(left: &RelationEntry, right: &RelationEntry) -> Self {
        let mut values = Vec::with_capacity(left.row.len() + right.row.len());
        values.extend(left.values().iter().cloned());
        values.extend(right.values().iter().cloned());
        Self::from_values(values)
    }

    /// Appends derived values after the existing columns.
    pub fn extend(&self, extra: impl IntoIterator<Item = Value>) -> Self {
        let mut values = self.values().to_vec();
        values.extend(extra);
        Self::from_values(values)
    }
}

/// A relation is a collection of entries with table context.
///
/// Every entry's values are the concatenation of the columns of `tables`, in
/// order; `table_column_counts[i]` is the width of `tables[i]`.
#[derive(Clone, Debug, Default)]
pub struct Relation {
    /// The entries in this relation.
    pub entries: Vec<RelationEntry>,
    /// Table names (or aliases) in this relation.
    pub tables: Vec<String>,
    /// Column counts for each table.
    pub table_column_counts: Vec<usize>,
}

impl Relation {
    /// Creates an empty relation.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a single-table relation from stored rows.
    pub fn from_rows(rows: Vec<Arc<Row>>, table: impl Into<String>, column_count: usize) -> Self {
        Self {
            entries: rows.into_iter().map(RelationEntry::new).collect(),
            tables: vec![table.into()],
            table_column_counts: vec![column_count],
        }
    }

    /// Creates a single-table relation from owned rows.
    pub fn from_rows_owned(rows: Vec<Row>, table: impl Into<String>, column_count: usize) -> Self {
        Self::from_rows(rows.into_iter().map(Arc::new).collect(), table, column_count)
    }

    /// Returns the tables in this relation.
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    /// Returns the column counts for each table.
    pub fn table_column_counts(&self) -> &[usize] {
        &self.table_column_counts
    }

    /// Returns the total column width of an entry.
    pub fn width(&self) -> usize {
        self.table_column_counts.iter().sum()
    }

    /// Computes the column offset for a given table name.
    pub fn get_table_offset(&self, table_name: &str) -> Option<usize> {
        let mut offset = 0;
        for (i, t) in self.tables.iter().enumerate() {
            if t == table_name {
                return Some(offset);
            }
            offset += self.table_column_counts.get(i).copied().unwrap_or(0);
        }
        None
    }

    /// Collapses the relation's table context into a single named table.
    pub fn rename(mut self, name: impl Into<String>) -> Self {
        let width = self.width();
        self.tables = vec![name.into()];
        self.table_column_counts = vec![width];
        self
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the relation is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over the entries.
    pub fn iter(&self) -> impl Iterator<Item = &RelationEntry> {
        self.entries.iter()
    }

    /// Consumes the relation and returns the raw value rows.
    pub fn into_values(self) -> Vec<Vec<Value>> {
        self.entries
            .into_iter()
            .map(|e| e.row.values().to_vec())
            .collect()
    }
}

impl IntoIterator for Relation {
    type Item = RelationEntry;
    type IntoIter = std::vec::IntoIter<RelationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_entry_combine() {
        let left = RelationEntry::new(Arc::new(Row::new(1, vec![Value::Int64(1)])));
        let right = RelationEntry::new(Arc::new(Row::new(2, vec![Value::Int64(2)])));

        let combined = RelationEntry::combine(&left, &right);
        assert!(combined.row.is_dummy());
        assert_eq!(combined.values(), &[Value::Int64(1), Value::Int64(2)]);
    }

    #[test]
    fn test_relation_offsets() {
        let relation = Relation {
            entries: Vec::new(),
            tables: vec!["shipments".into(), "customers".into()],
            table_column_counts: vec![7, 4],
        };
        assert_eq!(relation.get_table_offset("shipments"), Some(0));
        assert_eq!(relation.get_table_offset("customers"), Some(7));
        assert_eq!(relation.get_table_offset("parts"), None);
        assert_eq!(relation.width(), 11);

        let renamed = relation.rename("v");
        assert_eq!(renamed.tables(), &["v"]);
        assert_eq!(renamed.table_column_counts(), &[11]);
    }

    #[test]
    fn test_relation_from_rows() {
        let rows = vec![
            Row::new(1, vec![Value::Int64(1)]),
            Row::new(2, vec![Value::Int64(2)]),
        ];
        let relation = Relation::from_rows_owned(rows, "customers", 1);
        assert_eq!(relation.len(), 2);
        assert_eq!(relation.tables(), &["customers"]);
        assert_eq!(
            relation.into_values(),
            vec![vec![Value::Int64(1)], vec![Value::Int64(2)]]
        );
    }
}
