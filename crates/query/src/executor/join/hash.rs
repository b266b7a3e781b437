//! Hash Join implementation.

use crate::executor::{Relation, RelationEntry};
use crate::planner::JoinKind;
use core::hash::{Hash, Hasher};
use hashbrown::HashMap;
use shipdb_core::Value;

/// A wrapper around Value reference that implements Hash and Eq for use as HashMap key.
/// This avoids cloning Value during hash table operations.
#[derive(Clone, Copy)]
struct ValueRef<'a>(&'a Value);

impl<'a> Hash for ValueRef<'a> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<'a> PartialEq for ValueRef<'a> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<'a> Eq for ValueRef<'a> {}

/// Extracts the composite key of an entry. Rows with a null (or missing) key
/// component never match anything.
fn composite_key<'a>(entry: &'a RelationEntry, indices: &[usize]) -> Option<Vec<ValueRef<'a>>> {
    indices
        .iter()
        .map(|&idx| match entry.get_field(idx) {
            Some(v) if !v.is_null() => Some(ValueRef(v)),
            _ => None,
        })
        .collect()
}

/// Looks up the right-side matches of a left entry.
fn matching_rows<'t, 'a>(
    hash_table: &'t HashMap<Vec<ValueRef<'a>>, Vec<u32>>,
    entry: &'a RelationEntry,
    keys: &[usize],
) -> Option<&'t [u32]> {
    let key = composite_key(entry, keys)?;
    hash_table.get(&key).map(Vec::as_slice)
}

/// Hash Join executor.
///
/// Builds a hash table over the right relation and looks up every left entry
/// in order, so the output follows the left input's row order.
pub struct HashJoin {
    /// Key column indices in the left relation.
    left_keys: Vec<usize>,
    /// Key column indices in the right relation, paired with `left_keys`.
    right_keys: Vec<usize>,
    kind: JoinKind,
}

impl HashJoin {
    /// Creates a new hash join executor.
    pub fn new(left_keys: Vec<usize>, right_keys: Vec<usize>, kind: JoinKind) -> Self {
        Self {
            left_keys,
            right_keys,
            kind,
        }
    }

    /// Creates an inner hash join on a single key pair.
    pub fn inner(left_key_index: usize, right_key_index: usize) -> Self {
        Self::new(vec![left_key_index], vec![right_key_index], JoinKind::Inner)
    }

    /// Executes the hash join.
    pub fn execute(&self, left: Relation, right: Relation) -> Relation {
        // Build phase: map key values to right entry indices
        let mut hash_table: HashMap<Vec<ValueRef<'_>>, Vec<u32>> =
            HashMap::with_capacity(right.len());

        for (idx, entry) in right.entries.iter().enumerate() {
            if let Some(key) = composite_key(entry, &self.right_keys) {
                hash_table.entry(key).or_default().push(idx as u32);
            }
        }

        match self.kind {
            JoinKind::Semi | JoinKind::Anti => {
                let keep_matched = self.kind == JoinKind::Semi;
                let entries: Vec<RelationEntry> = left
                    .entries
                    .iter()
                    .filter(|entry| {
                        matching_rows(&hash_table, entry, &self.left_keys).is_some() == keep_matched
                    })
                    .cloned()
                    .collect();
                Relation {
                    entries,
                    tables: left.tables.clone(),
                    table_column_counts: left.table_column_counts.clone(),
                }
            }
            JoinKind::Inner => {
                let mut result_entries = Vec::with_capacity(left.len());
                for left_entry in left.entries.iter() {
                    let matches = matching_rows(&hash_table, left_entry, &self.left_keys);
                    for &build_idx in matches.unwrap_or_default() {
                        let build_entry = &right.entries[build_idx as usize];
                        result_entries.push(RelationEntry::combine(left_entry, build_entry));
                    }
                }

                let mut tables = left.tables.clone();
                tables.extend(right.tables.iter().cloned());
                let mut table_column_counts = left.table_column_counts.clone();
                table_column_counts.extend(right.table_column_counts.iter().copied());

                Relation {
                    entries: result_entries,
                    tables,
                    table_column_counts,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipdb_core::Row;

    fn customers() -> Relation {
        let rows = vec![
            Row::new(10, vec![Value::Int64(1), Value::String("Alice".into())]),
            Row::new(11, vec![Value::Int64(2), Value::String("Bob".into())]),
            Row::new(12, vec![Value::Int64(3), Value::String("Carol".into())]),
        ];
        Relation::from_rows_owned(rows, "customers", 2)
    }

    fn shipments() -> Relation {
        // (customer_id, part_code)
        let rows = vec![
            Row::new(20, vec![Value::Int64(2), Value::String("P1".into())]),
            Row::new(21, vec![Value::Int64(1), Value::String("P1".into())]),
            Row::new(22, vec![Value::Int64(2), Value::String("P2".into())]),
            Row::new(23, vec![Value::Null, Value::String("P3".into())]),
        ];
        Relation::from_rows_owned(rows, "shipments", 2)
    }

    #[test]
    fn test_inner_join_follows_left_order() {
        let result = HashJoin::inner(0, 0).execute(shipments(), customers());

        assert_eq!(result.len(), 3);
        assert_eq!(result.tables(), &["shipments", "customers"]);
        assert_eq!(result.table_column_counts(), &[2, 2]);
        let names: Vec<_> = result
            .iter()
            .map(|e| e.get_field(3).and_then(Value::as_str).unwrap_or("").to_string())
            .collect();
        assert_eq!(names, vec!["Bob", "Alice", "Bob"]);
    }

    #[test]
    fn test_semi_join() {
        let join = HashJoin::new(vec![0], vec![0], JoinKind::Semi);
        let result = join.execute(customers(), shipments());

        let ids: Vec<_> = result.iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec![10, 11]);
        assert_eq!(result.tables(), &["customers"]);
    }

    #[test]
    fn test_anti_join() {
        let join = HashJoin::new(vec![0], vec![0], JoinKind::Anti);
        let result = join.execute(customers(), shipments());

        let ids: Vec<_> = result.iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec![12]);
    }

    #[test]
    fn test_anti_join_keeps_null_keys() {
        let join = HashJoin::new(vec![0], vec![0], JoinKind::Anti);
        let result = join.execute(shipments(), customers());

        let ids: Vec<_> = result.iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec![23]);
    }

    #[test]
    fn test_composite_key_join() {
        let pairs = Relation::from_rows_owned(
            vec![
                Row::new(1, vec![Value::Int64(2), Value::String("P1".into())]),
                Row::new(2, vec![Value::Int64(2), Value::String("P9".into())]),
            ],
            "pairs",
            2,
        );
        let join = HashJoin::new(vec![0, 1], vec![0, 1], JoinKind::Semi);
        let result = join.execute(pairs, shipments());

        let ids: Vec<_> = result.iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec![1]);
    }
}
