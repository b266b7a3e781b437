//! Project executor.

use crate::ast::Expr;
use crate::executor::eval::{eval_expr, EvalContext};
use crate::executor::{ExecutionResult, Relation, RelationEntry};
use shipdb_core::{Row, Value};
use std::sync::Arc;

/// Project executor - evaluates the SELECT list for every row.
///
/// The output is a single table named by the projection alias; each entry keeps
/// the row id of the row it was computed from.
pub struct ProjectExecutor<'p> {
    columns: &'p [Expr],
    alias: &'p str,
}

impl<'p> ProjectExecutor<'p> {
    /// Creates a new project executor.
    pub fn new(columns: &'p [Expr], alias: &'p str) -> Self {
        Self { columns, alias }
    }

    /// Executes the projection on the input relation.
    pub fn execute(&self, input: Relation) -> ExecutionResult<Relation> {
        let tables = input.tables().to_vec();
        let table_column_counts = input.table_column_counts().to_vec();
        let ctx = EvalContext::new(&tables, &table_column_counts);

        let entries = input
            .entries
            .iter()
            .map(|entry| {
                let values = self
                    .columns
                    .iter()
                    .map(|expr| eval_expr(expr, entry, &ctx))
                    .collect::<ExecutionResult<Vec<Value>>>()?;
                Ok(RelationEntry::new(Arc::new(Row::new(entry.id(), values))))
            })
            .collect::<ExecutionResult<Vec<RelationEntry>>>()?;

        Ok(Relation {
            entries,
            tables: vec![self.alias.to_string()],
            table_column_counts: vec![self.columns.len()],
        })
    }
}

/// Projects a relation using a transformation function.
pub fn project_relation<F>(input: Relation, alias: &str, width: usize, transform: F) -> Relation
where
    F: Fn(&RelationEntry) -> Vec<Value>,
{
    let entries: Vec<RelationEntry> = input
        .into_iter()
        .map(|entry| RelationEntry::new(Arc::new(Row::new(entry.id(), transform(&entry)))))
        .collect();

    Relation {
        entries,
        tables: vec![alias.to_string()],
        table_column_counts: vec![width],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn shipments() -> Relation {
        let rows = vec![
            Row::new(1, vec![Value::Int64(1), Value::String("P1".into()), Value::Decimal(Decimal::from(3))]),
            Row::new(2, vec![Value::Int64(2), Value::String("P2".into()), Value::Decimal(Decimal::from(2))]),
        ];
        Relation::from_rows_owned(rows, "shipments", 3)
    }

    #[test]
    fn test_project_executor() {
        let columns = vec![
            Expr::column("shipments", "part_code", 1),
            Expr::mul(
                Expr::column("shipments", "qty", 2),
                Expr::literal(Decimal::new(25, 1)),
            ),
        ];
        let result = ProjectExecutor::new(&columns, "p").execute(shipments()).unwrap();

        assert_eq!(result.tables(), &["p"]);
        assert_eq!(result.table_column_counts(), &[2]);
        assert_eq!(result.entries[0].id(), 1);
        assert_eq!(
            result.entries[0].values(),
            &[Value::String("P1".into()), Value::Decimal(Decimal::new(75, 1))]
        );
    }

    #[test]
    fn test_project_missing_table_yields_null() {
        let columns = vec![Expr::column("customers", "name", 1)];
        let result = ProjectExecutor::new(&columns, "p").execute(shipments()).unwrap();
        assert_eq!(result.entries[0].values(), &[Value::Null]);
    }

    #[test]
    fn test_project_relation_closure() {
        let result = project_relation(shipments(), "codes", 1, |entry| {
            vec![entry.get_field(1).cloned().unwrap_or(Value::Null)]
        });
        assert_eq!(result.len(), 2);
        assert_eq!(result.entries[1].values(), &[Value::String("P2".into())]);
    }
}
