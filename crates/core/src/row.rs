//! Stored and derived rows.
//!
//! A stored row carries an id handed out by a process-wide counter. Rows built
//! by joins, projections and aggregates that have no stored counterpart carry
//! [`DUMMY_ROW_ID`] instead.

use crate::value::Value;
use core::sync::atomic::{AtomicU64, Ordering};

/// Identifier of a stored row. Distinct from a table's primary key.
pub type RowId = u64;

/// Id of rows with no stored counterpart, such as a customer summary.
pub const DUMMY_ROW_ID: RowId = u64::MAX;

static NEXT_ROW_ID: AtomicU64 = AtomicU64::new(0);

/// Hands out a fresh row id; ids grow in insertion order.
pub fn next_row_id() -> RowId {
    NEXT_ROW_ID.fetch_add(1, Ordering::SeqCst)
}

/// Column values of one table row, in schema column order.
#[derive(Clone, Debug)]
pub struct Row {
    id: RowId,
    values: Vec<Value>,
}

impl Row {
    pub fn new(id: RowId, values: Vec<Value>) -> Self {
        Self { id, values }
    }

    /// A row about to be inserted; takes the next id from the counter.
    pub fn create(values: Vec<Value>) -> Self {
        Self::new(next_row_id(), values)
    }

    /// A derived row with no stored counterpart.
    pub fn dummy(values: Vec<Value>) -> Self {
        Self::new(DUMMY_ROW_ID, values)
    }

    #[inline]
    pub fn id(&self) -> RowId {
        self.id
    }

    #[inline]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Value of the column at `index`, or `None` past the last column.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Overwrites one column, e.g. an auto-increment key filled on insert.
    /// Returns false and leaves the row unchanged past the last column.
    pub fn set(&mut self, index: usize, value: Value) -> bool {
        match self.values.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Number of columns.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn is_dummy(&self) -> bool {
        self.id == DUMMY_ROW_ID
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.values == other.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(id: RowId) -> Row {
        Row::new(id, vec![Value::Int64(1), Value::String("Alice".into())])
    }

    #[test]
    fn test_get_by_position() {
        let row = customer(1);
        assert_eq!(row.id(), 1);
        assert_eq!(row.len(), 2);
        assert!(!row.is_empty());
        assert_eq!(row.get(0), Some(&Value::Int64(1)));
        assert_eq!(row.get(1), Some(&Value::String("Alice".into())));
        assert_eq!(row.get(2), None);
    }

    #[test]
    fn test_set_fills_auto_increment_key() {
        let mut row = Row::new(1, vec![Value::Null, Value::String("Alice".into())]);
        assert!(row.set(0, Value::Int64(7)));
        assert_eq!(row.get(0), Some(&Value::Int64(7)));
        assert!(!row.set(2, Value::Int64(8)));
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn test_created_rows_get_increasing_ids() {
        let first = Row::create(vec![Value::Int64(1)]);
        let second = Row::create(vec![Value::Int64(2)]);
        assert!(second.id() > first.id());
    }

    #[test]
    fn test_summary_row_is_dummy() {
        let row = Row::dummy(vec![Value::Int64(5), Value::Int64(130)]);
        assert!(row.is_dummy());
        assert!(!customer(1).is_dummy());
        assert_eq!(row.into_values(), vec![Value::Int64(5), Value::Int64(130)]);
    }

    #[test]
    fn test_equality_includes_id() {
        assert_eq!(customer(1), customer(1));
        assert_ne!(customer(1), customer(2));
    }
}
