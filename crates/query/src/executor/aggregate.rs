//! Aggregate executor.

use crate::ast::AggregateFunc;
use crate::executor::{ExecutionError, ExecutionResult, Relation, RelationEntry};
use rust_decimal::Decimal;
use shipdb_core::Value;
use std::collections::BTreeMap;

/// Aggregate executor - computes aggregate functions.
pub struct AggregateExecutor {
    /// Group by column indices.
    group_by: Vec<usize>,
    /// Aggregates to compute: (function, column_index). `None` means `COUNT(*)`.
    aggregates: Vec<(AggregateFunc, Option<usize>)>,
}

impl AggregateExecutor {
    /// Creates a new aggregate executor.
    pub fn new(group_by: Vec<usize>, aggregates: Vec<(AggregateFunc, Option<usize>)>) -> Self {
        Self {
            group_by,
            aggregates,
        }
    }

    /// Creates an aggregate executor with no grouping.
    pub fn no_group(aggregates: Vec<(AggregateFunc, Option<usize>)>) -> Self {
        Self::new(Vec::new(), aggregates)
    }

    /// Executes the aggregation on the input relation.
    ///
    /// Without grouping the result always holds exactly one row, even for an
    /// empty input.
    pub fn execute(&self, input: Relation, alias: &str) -> ExecutionResult<Relation> {
        let result_column_count = self.group_by.len() + self.aggregates.len();

        if self.group_by.is_empty() {
            let group: Vec<&RelationEntry> = input.iter().collect();
            let values = self.compute_aggregates(&group)?;
            return Ok(Relation {
                entries: vec![RelationEntry::from_values(values)],
                tables: vec![alias.to_string()],
                table_column_counts: vec![result_column_count],
            });
        }

        let mut groups: BTreeMap<Vec<Value>, Vec<&RelationEntry>> = BTreeMap::new();
        for entry in input.iter() {
            let key: Vec<Value> = self
                .group_by
                .iter()
                .map(|&idx| entry.get_field(idx).cloned().unwrap_or(Value::Null))
                .collect();
            groups.entry(key).or_default().push(entry);
        }

        let entries = groups
            .into_iter()
            .map(|(mut values, group)| {
                values.extend(self.compute_aggregates(&group)?);
                Ok(RelationEntry::from_values(values))
            })
            .collect::<ExecutionResult<Vec<RelationEntry>>>()?;

        Ok(Relation {
            entries,
            tables: vec![alias.to_string()],
            table_column_counts: vec![result_column_count],
        })
    }

    fn compute_aggregates(&self, entries: &[&RelationEntry]) -> ExecutionResult<Vec<Value>> {
        self.aggregates
            .iter()
            .map(|(func, col_idx)| compute_aggregate(*func, *col_idx, entries))
            .collect()
    }
}

/// Computes one aggregate over a group of entries.
///
/// SUM stays integral while every input is an integer and widens to decimal
/// otherwise. SUM, MIN and MAX of a group without non-null inputs are null.
/// A SUM outside the decimal range is an error.
pub(crate) fn compute_aggregate(
    func: AggregateFunc,
    col_idx: Option<usize>,
    entries: &[&RelationEntry],
) -> ExecutionResult<Value> {
    let non_null = |idx: usize| {
        entries
            .iter()
            .filter_map(move |e| e.get_field(idx))
            .filter(|v| !v.is_null())
    };

    let value = match func {
        AggregateFunc::Count => match col_idx {
            // COUNT(column) - count non-null values
            Some(idx) => Value::Int64(non_null(idx).count() as i64),
            // COUNT(*) - count all rows
            None => Value::Int64(entries.len() as i64),
        },
        AggregateFunc::Sum => {
            let idx = col_idx.unwrap_or(0);
            let mut int_sum: Option<i64> = Some(0);
            let mut dec_sum: Option<Decimal> = Some(Decimal::ZERO);
            let mut seen = false;

            for value in non_null(idx) {
                let Some(d) = value.to_decimal() else {
                    continue;
                };
                seen = true;
                dec_sum = dec_sum.and_then(|acc| acc.checked_add(d));
                int_sum = match (int_sum, value) {
                    (Some(acc), Value::Int64(i)) => acc.checked_add(*i),
                    _ => None,
                };
            }

            match (seen, int_sum, dec_sum) {
                (false, _, _) => Value::Null,
                (true, Some(i), _) => Value::Int64(i),
                (true, None, Some(d)) => Value::Decimal(d),
                (true, None, None) => return Err(ExecutionError::NumericOverflow("SUM".into())),
            }
        }
        AggregateFunc::Min => col_idx
            .and_then(|idx| non_null(idx).min().cloned())
            .unwrap_or(Value::Null),
        AggregateFunc::Max => col_idx
            .and_then(|idx| non_null(idx).max().cloned())
            .unwrap_or(Value::Null),
    };
    Ok(value)
}
