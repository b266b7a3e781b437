//! Filter executor.

use crate::ast::Expr;
use crate::executor::eval::{eval_predicate, EvalContext};
use crate::executor::{ExecutionResult, Relation, RelationEntry};

/// Filter executor - keeps rows for which the predicate evaluates to `TRUE`.
pub struct FilterExecutor<'p> {
    predicate: &'p Expr,
}

impl<'p> FilterExecutor<'p> {
    /// Creates a new filter executor.
    pub fn new(predicate: &'p Expr) -> Self {
        Self { predicate }
    }

    /// Executes the filter on the input relation. Fails on the first entry
    /// whose predicate cannot be evaluated.
    pub fn execute(&self, input: Relation) -> ExecutionResult<Relation> {
        let tables = input.tables().to_vec();
        let table_column_counts = input.table_column_counts().to_vec();
        let ctx = EvalContext::new(&tables, &table_column_counts);
        let mut entries = Vec::with_capacity(input.len());
        for entry in input.entries {
            if eval_predicate(self.predicate, &entry, &ctx)? {
                entries.push(entry);
            }
        }

        Ok(Relation {
            entries,
            tables,
            table_column_counts,
        })
    }
}

/// Filters a relation using a closure.
pub fn filter_relation<F>(input: Relation, predicate: F) -> Relation
where
    F: Fn(&RelationEntry) -> bool,
{
    let tables = input.tables().to_vec();
    let table_column_counts = input.table_column_counts().to_vec();
    let entries: Vec<RelationEntry> = input.into_iter().filter(|e| predicate(e)).collect();

    Relation {
        entries,
        tables,
        table_column_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipdb_core::{Row, Value};

    fn warehouses() -> Relation {
        let rows = vec![
            Row::new(1, vec![Value::Int64(5), Value::Int64(10)]),
            Row::new(2, vec![Value::Int64(7), Value::Int64(20)]),
            Row::new(3, vec![Value::Null, Value::Int64(30)]),
        ];
        Relation::from_rows_owned(rows, "shipments", 2)
    }

    #[test]
    fn test_filter_executor() {
        let predicate = Expr::ne(
            Expr::column("shipments", "warehouse_no", 0),
            Expr::literal(5i64),
        );
        let result = FilterExecutor::new(&predicate).execute(warehouses()).unwrap();

        // The null warehouse is neither equal nor unequal to 5.
        assert_eq!(result.len(), 1);
        assert_eq!(result.entries[0].id(), 2);
        assert_eq!(result.tables(), &["shipments"]);
    }

    #[test]
    fn test_filter_predicate_overflow() {
        let predicate = Expr::gt(
            Expr::mul(
                Expr::column("shipments", "qty", 1),
                Expr::literal(i64::MAX),
            ),
            Expr::literal(0i64),
        );
        let result = FilterExecutor::new(&predicate).execute(warehouses());
        assert!(matches!(
            result,
            Err(crate::executor::ExecutionError::NumericOverflow(_))
        ));
    }

    #[test]
    fn test_filter_relation_closure() {
        let result = filter_relation(warehouses(), |entry| {
            entry
                .get_field(1)
                .and_then(|v| v.as_i64())
                .map(|v| v > 15)
                .unwrap_or(false)
        });
        assert_eq!(result.len(), 2);
    }
}
