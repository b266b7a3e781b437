//! Distinct executor.

use crate::executor::Relation;
use hashbrown::HashSet;
use shipdb_core::Value;

/// Removes duplicate rows, comparing whole rows and keeping first occurrences.
pub fn distinct_relation(input: Relation) -> Relation {
    let mut seen: HashSet<Vec<Value>> = HashSet::with_capacity(input.len());
    let Relation {
        entries,
        tables,
        table_column_counts,
    } = input;

    let entries = entries
        .into_iter()
        .filter(|entry| seen.insert(entry.values().to_vec()))
        .collect();

    Relation {
        entries,
        tables,
        table_column_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipdb_core::Row;

    #[test]
    fn test_distinct_keeps_first_occurrence() {
        let rows = vec![
            Row::new(1, vec![Value::Int64(1), Value::String("P1".into())]),
            Row::new(2, vec![Value::Int64(1), Value::String("P2".into())]),
            Row::new(3, vec![Value::Int64(1), Value::String("P1".into())]),
            Row::new(4, vec![Value::Null, Value::String("P1".into())]),
            Row::new(5, vec![Value::Null, Value::String("P1".into())]),
        ];
        let input = Relation::from_rows_owned(rows, "pairs", 2);

        let result = distinct_relation(input);
        let ids: Vec<_> = result.iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec![1, 2, 4]);
        assert_eq!(result.tables(), &["pairs"]);
    }
}
