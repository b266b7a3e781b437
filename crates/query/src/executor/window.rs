//! Window aggregate executor.

use crate::ast::AggregateFunc;
use crate::executor::aggregate::compute_aggregate;
use crate::executor::{ExecutionResult, Relation, RelationEntry};
use hashbrown::HashMap;
use shipdb_core::Value;

/// Window executor - `func(arg) OVER (PARTITION BY ...)` without frames.
///
/// Every row keeps its position and gains one trailing column holding the
/// aggregate over its whole partition.
pub struct WindowExecutor {
    partition_by: Vec<usize>,
    func: AggregateFunc,
    arg: Option<usize>,
}

impl WindowExecutor {
    /// Creates a new window executor.
    pub fn new(partition_by: Vec<usize>, func: AggregateFunc, arg: Option<usize>) -> Self {
        Self {
            partition_by,
            func,
            arg,
        }
    }

    /// Executes the window aggregate. The appended column is exposed as a
    /// one-column table named `alias`.
    pub fn execute(&self, input: Relation, alias: &str) -> ExecutionResult<Relation> {
        let mut partitions: HashMap<Vec<Value>, Vec<usize>> = HashMap::new();
        let mut row_partition: Vec<Vec<Value>> = Vec::with_capacity(input.len());

        for (idx, entry) in input.entries.iter().enumerate() {
            let key: Vec<Value> = self
                .partition_by
                .iter()
                .map(|&i| entry.get_field(i).cloned().unwrap_or(Value::Null))
                .collect();
            partitions.entry(key.clone()).or_default().push(idx);
            row_partition.push(key);
        }

        let totals = partitions
            .iter()
            .map(|(key, members)| {
                let group: Vec<&RelationEntry> =
                    members.iter().map(|&i| &input.entries[i]).collect();
                Ok((key, compute_aggregate(self.func, self.arg, &group)?))
            })
            .collect::<ExecutionResult<HashMap<&Vec<Value>, Value>>>()?;

        let entries: Vec<RelationEntry> = input
            .entries
            .iter()
            .zip(&row_partition)
            .map(|(entry, key)| {
                let total = totals.get(key).cloned().unwrap_or(Value::Null);
                entry.extend([total])
            })
            .collect();

        let mut tables = input.tables.clone();
        tables.push(alias.to_string());
        let mut table_column_counts = input.table_column_counts.clone();
        table_column_counts.push(1);

        Ok(Relation {
            entries,
            tables,
            table_column_counts,
        })
    }
}
