//! Expression evaluation over relation entries.
//!
//! Follows SQL three-valued logic: comparisons and arithmetic with a null
//! operand yield null, a predicate is satisfied only by `TRUE`, division by
//! zero yields null. Arithmetic overflow is an error.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::executor::{ExecutionError, ExecutionResult, RelationEntry};
use rust_decimal::{Decimal, RoundingStrategy};
use shipdb_core::Value;
use std::cmp::Ordering;

/// Context for expression evaluation in JOIN queries.
/// Contains table metadata needed to compute correct column indices at runtime.
#[derive(Clone, Debug)]
pub struct EvalContext<'a> {
    /// Table names in the relation (in order).
    pub tables: &'a [String],
    /// Column counts for each table (used to compute offsets).
    pub table_column_counts: &'a [usize],
}

impl<'a> EvalContext<'a> {
    /// Creates a new evaluation context.
    #[inline]
    pub fn new(tables: &'a [String], table_column_counts: &'a [usize]) -> Self {
        Self {
            tables,
            table_column_counts,
        }
    }

    /// Computes the column index in the combined row from a table name and a
    /// table-relative index. Returns None if the table is not part of the relation.
    #[inline]
    pub fn resolve_column_index(&self, table_name: &str, table_relative_index: usize) -> Option<usize> {
        let mut offset = 0;
        for (i, t) in self.tables.iter().enumerate() {
            let width = self.table_column_counts.get(i).copied().unwrap_or(0);
            if t == table_name {
                return (table_relative_index < width).then_some(offset + table_relative_index);
            }
            offset += width;
        }
        None
    }
}

/// Evaluates an expression against a relation entry.
pub fn eval_expr(expr: &Expr, entry: &RelationEntry, ctx: &EvalContext<'_>) -> ExecutionResult<Value> {
    match expr {
        Expr::Column(col) => Ok(ctx
            .resolve_column_index(&col.table, col.index)
            .and_then(|idx| entry.get_field(idx))
            .cloned()
            .unwrap_or(Value::Null)),

        Expr::Literal(value) => Ok(value.clone()),

        Expr::BinaryOp { left, op, right } => {
            let left_val = eval_expr(left, entry, ctx)?;
            let right_val = eval_expr(right, entry, ctx)?;
            eval_binary_op(*op, &left_val, &right_val)
        }

        Expr::UnaryOp { op, expr } => {
            let val = eval_expr(expr, entry, ctx)?;
            Ok(eval_unary_op(*op, &val))
        }

        Expr::Function { name, args } => {
            let arg_values = args
                .iter()
                .map(|a| eval_expr(a, entry, ctx))
                .collect::<ExecutionResult<Vec<Value>>>()?;
            Ok(eval_function(name, &arg_values))
        }
    }
}

/// Evaluates a predicate. Null and non-boolean results count as not satisfied.
#[inline]
pub fn eval_predicate(
    expr: &Expr,
    entry: &RelationEntry,
    ctx: &EvalContext<'_>,
) -> ExecutionResult<bool> {
    Ok(matches!(eval_expr(expr, entry, ctx)?, Value::Boolean(true)))
}

type IntOp = fn(i64, i64) -> Option<i64>;
type DecimalOp = fn(Decimal, Decimal) -> Option<Decimal>;

/// Compares two non-null values, or None when they are not comparable.
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Int64(_) | Value::Decimal(_), Value::Int64(_) | Value::Decimal(_)) => {
            Some(left.to_decimal()?.cmp(&right.to_decimal()?))
        }
        _ if left.data_type() == right.data_type() => Some(left.cmp(right)),
        _ => None,
    }
}

pub(crate) fn eval_binary_op(op: BinaryOp, left: &Value, right: &Value) -> ExecutionResult<Value> {
    if left.is_null() || right.is_null() {
        return Ok(match op {
            // NULL AND FALSE = FALSE, NULL OR TRUE = TRUE
            BinaryOp::And if left.as_bool() == Some(false) || right.as_bool() == Some(false) => {
                Value::Boolean(false)
            }
            BinaryOp::Or if left.as_bool() == Some(true) || right.as_bool() == Some(true) => {
                Value::Boolean(true)
            }
            _ => Value::Null,
        });
    }

    let (symbol, int_op, dec_op): (&str, IntOp, DecimalOp) = match op {
        BinaryOp::Eq => return Ok(cmp_value(left, right, |o| o == Ordering::Equal)),
        BinaryOp::Ne => return Ok(cmp_value(left, right, |o| o != Ordering::Equal)),
        BinaryOp::Lt => return Ok(cmp_value(left, right, |o| o == Ordering::Less)),
        BinaryOp::Le => return Ok(cmp_value(left, right, |o| o != Ordering::Greater)),
        BinaryOp::Gt => return Ok(cmp_value(left, right, |o| o == Ordering::Greater)),
        BinaryOp::Ge => return Ok(cmp_value(left, right, |o| o != Ordering::Less)),
        BinaryOp::And => {
            return Ok(match (left.as_bool(), right.as_bool()) {
                (Some(l), Some(r)) => Value::Boolean(l && r),
                _ => Value::Null,
            })
        }
        BinaryOp::Or => {
            return Ok(match (left.as_bool(), right.as_bool()) {
                (Some(l), Some(r)) => Value::Boolean(l || r),
                _ => Value::Null,
            })
        }
        BinaryOp::Add => ("+", i64::checked_add, Decimal::checked_add),
        BinaryOp::Sub => ("-", i64::checked_sub, Decimal::checked_sub),
        BinaryOp::Mul => ("*", i64::checked_mul, Decimal::checked_mul),
        BinaryOp::Div if right.to_decimal().is_some_and(|d| d.is_zero()) => {
            return Ok(Value::Null)
        }
        // Integer division truncates toward zero.
        BinaryOp::Div => ("/", i64::checked_div, Decimal::checked_div),
    };
    eval_arithmetic(symbol, left, right, int_op, dec_op)
}

fn cmp_value(left: &Value, right: &Value, test: impl Fn(Ordering) -> bool) -> Value {
    match compare(left, right) {
        Some(ordering) => Value::Boolean(test(ordering)),
        None => Value::Null,
    }
}

/// Integer operands stay integers; any decimal operand widens both to decimal.
/// Non-numeric operands yield null.
fn eval_arithmetic(
    symbol: &str,
    left: &Value,
    right: &Value,
    int_op: IntOp,
    dec_op: DecimalOp,
) -> ExecutionResult<Value> {
    let overflow = || ExecutionError::NumericOverflow(format!("{} {} {}", left, symbol, right));
    match (left, right) {
        (Value::Int64(a), Value::Int64(b)) => int_op(*a, *b).map(Value::Int64).ok_or_else(overflow),
        _ => match (left.to_decimal(), right.to_decimal()) {
            (Some(a), Some(b)) => dec_op(a, b).map(Value::Decimal).ok_or_else(overflow),
            _ => Ok(Value::Null),
        },
    }
}

fn eval_unary_op(op: UnaryOp, value: &Value) -> Value {
    match op {
        UnaryOp::Not => match value {
            Value::Boolean(b) => Value::Boolean(!b),
            _ => Value::Null,
        },
        UnaryOp::IsNull => Value::Boolean(value.is_null()),
        UnaryOp::IsNotNull => Value::Boolean(!value.is_null()),
    }
}

fn eval_function(name: &str, args: &[Value]) -> Value {
    match name.to_uppercase().as_str() {
        // Half away from zero, the store's native numeric rounding.
        "ROUND" => {
            let scale = match args.get(1) {
                Some(Value::Int64(s)) => u32::try_from(*s).unwrap_or(0),
                None => 0,
                _ => return Value::Null,
            };
            match args.first() {
                Some(Value::Decimal(d)) => Value::Decimal(
                    d.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero),
                ),
                Some(Value::Int64(i)) => Value::Int64(*i),
                _ => Value::Null,
            }
        }
        "COALESCE" => args
            .iter()
            .find(|arg| !arg.is_null())
            .cloned()
            .unwrap_or(Value::Null),
        "YEAR" => match args.first() {
            Some(Value::Date(d)) => Value::Int64(i64::from(d.year())),
            _ => Value::Null,
        },
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipdb_core::Row;
    use std::sync::Arc;
    use time::macros::date;

    fn entry(values: Vec<Value>) -> RelationEntry {
        RelationEntry::new(Arc::new(Row::dummy(values)))
    }

    fn dec(m: i64, s: u32) -> Value {
        Value::Decimal(Decimal::new(m, s))
    }

    #[test]
    fn test_resolve_column_index() {
        let tables = vec!["shipments".to_string(), "customers".to_string()];
        let counts = vec![7, 4];
        let ctx = EvalContext::new(&tables, &counts);
        assert_eq!(ctx.resolve_column_index("shipments", 5), Some(5));
        assert_eq!(ctx.resolve_column_index("customers", 3), Some(10));
        assert_eq!(ctx.resolve_column_index("customers", 4), None);
        assert_eq!(ctx.resolve_column_index("parts", 0), None);
    }

    #[test]
    fn test_column_and_comparison() {
        let tables = vec!["parts".to_string()];
        let counts = vec![2];
        let ctx = EvalContext::new(&tables, &counts);
        let row = entry(vec![Value::String("P1".into()), dec(15000, 2)]);

        let expensive = Expr::gt(Expr::column("parts", "plan_price", 1), Expr::literal(100i64));
        assert_eq!(eval_predicate(&expensive, &row, &ctx), Ok(true));

        let cheap = Expr::le(Expr::column("parts", "plan_price", 1), Expr::literal(100i64));
        assert_eq!(eval_predicate(&cheap, &row, &ctx), Ok(false));
    }

    #[test]
    fn test_null_semantics() {
        assert_eq!(
            eval_binary_op(BinaryOp::Eq, &Value::Null, &Value::Null),
            Ok(Value::Null)
        );
        assert_eq!(
            eval_binary_op(BinaryOp::Add, &Value::Int64(1), &Value::Null),
            Ok(Value::Null)
        );
        assert_eq!(
            eval_binary_op(BinaryOp::And, &Value::Null, &Value::Boolean(false)),
            Ok(Value::Boolean(false))
        );
        assert_eq!(
            eval_binary_op(BinaryOp::Or, &Value::Null, &Value::Boolean(true)),
            Ok(Value::Boolean(true))
        );
        assert_eq!(eval_unary_op(UnaryOp::Not, &Value::Null), Value::Null);
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(
            eval_binary_op(BinaryOp::Mul, &dec(25, 1), &Value::Int64(4)),
            Ok(Value::Decimal(Decimal::from(10)))
        );
        assert_eq!(
            eval_binary_op(BinaryOp::Add, &Value::Int64(2), &Value::Int64(3)),
            Ok(Value::Int64(5))
        );
        assert_eq!(
            eval_binary_op(BinaryOp::Div, &dec(10, 0), &dec(0, 0)),
            Ok(Value::Null)
        );
        assert_eq!(
            eval_binary_op(BinaryOp::Div, &Value::Int64(1), &Value::Int64(0)),
            Ok(Value::Null)
        );
    }

    #[test]
    fn test_arithmetic_overflow_is_error() {
        let max = Value::Decimal(Decimal::MAX);
        assert!(matches!(
            eval_binary_op(BinaryOp::Mul, &max, &Value::Int64(2)),
            Err(ExecutionError::NumericOverflow(_))
        ));
        assert!(matches!(
            eval_binary_op(BinaryOp::Add, &max, &max),
            Err(ExecutionError::NumericOverflow(_))
        ));
        assert!(matches!(
            eval_binary_op(BinaryOp::Mul, &Value::Int64(i64::MAX), &Value::Int64(2)),
            Err(ExecutionError::NumericOverflow(_))
        ));
        assert_eq!(
            eval_binary_op(BinaryOp::Mul, &max, &Value::Null),
            Ok(Value::Null)
        );
    }

    #[test]
    fn test_overflow_inside_expression_propagates() {
        let tables = vec!["shipments".to_string()];
        let counts = vec![1];
        let ctx = EvalContext::new(&tables, &counts);
        let row = entry(vec![Value::Decimal(Decimal::MAX)]);
        let line_value = Expr::function(
            "ROUND",
            vec![
                Expr::mul(Expr::column("shipments", "qty", 0), Expr::literal(10i64)),
                Expr::literal(2i64),
            ],
        );
        assert!(matches!(
            eval_expr(&line_value, &row, &ctx),
            Err(ExecutionError::NumericOverflow(_))
        ));
    }

    #[test]
    fn test_round_half_away_from_zero() {
        let round = |v: Value| eval_function("ROUND", &[v, Value::Int64(2)]);
        assert_eq!(round(dec(12345, 3)), dec(1235, 2));
        assert_eq!(round(dec(-12345, 3)), dec(-1235, 2));
        assert_eq!(round(dec(12344, 3)), dec(1234, 2));
        assert_eq!(round(Value::Null), Value::Null);
    }

    #[test]
    fn test_coalesce_and_year() {
        assert_eq!(
            eval_function("COALESCE", &[Value::Null, Value::Int64(0)]),
            Value::Int64(0)
        );
        assert_eq!(eval_function("COALESCE", &[Value::Null]), Value::Null);
        assert_eq!(
            eval_function("YEAR", &[Value::Date(date!(2024 - 03 - 01))]),
            Value::Int64(2024)
        );
    }

    #[test]
    fn test_incomparable_types() {
        assert_eq!(
            eval_binary_op(BinaryOp::Eq, &Value::String("5".into()), &Value::Int64(5)),
            Ok(Value::Null)
        );
    }
}
