//! Expression AST definitions.

use shipdb_core::Value;

/// Reference to a column in a table.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    /// Table name (or alias).
    pub table: String,
    /// Column name.
    pub column: String,
    /// Column index within that table.
    pub index: usize,
}

impl ColumnRef {
    /// Creates a new column reference.
    pub fn new(table: impl Into<String>, column: impl Into<String>, index: usize) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            index,
        }
    }

    /// Returns the normalized name (table.column).
    pub fn normalized_name(&self) -> String {
        format!("{}.{}", self.table, self.column)
    }
}

/// Binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical
    And,
    Or,
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
}

/// Unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    IsNull,
    IsNotNull,
}

/// Aggregate functions, usable both grouped and windowed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AggregateFunc {
    Count,
    Sum,
    Min,
    Max,
}

/// Sort order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Expression AST node.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Column reference.
    Column(ColumnRef),
    /// Literal value (a bound parameter).
    Literal(Value),
    /// Binary operation.
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    /// Unary operation.
    UnaryOp { op: UnaryOp, expr: Box<Expr> },
    /// Scalar function call: `ROUND`, `COALESCE`, `YEAR`.
    Function { name: String, args: Vec<Expr> },
}

impl Expr {
    /// Creates a column reference expression.
    pub fn column(table: impl Into<String>, column: impl Into<String>, index: usize) -> Self {
        Expr::Column(ColumnRef::new(table, column, index))
    }

    /// Creates a literal expression.
    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Creates an equality expression.
    pub fn eq(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Eq, right)
    }

    /// Creates a not-equal expression.
    pub fn ne(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Ne, right)
    }

    /// Creates a less-than expression.
    pub fn lt(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Lt, right)
    }

    /// Creates a less-than-or-equal expression.
    pub fn le(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Le, right)
    }

    /// Creates a greater-than expression.
    pub fn gt(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Gt, right)
    }

    /// Creates a greater-than-or-equal expression.
    pub fn ge(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Ge, right)
    }

    /// Creates an AND expression.
    pub fn and(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::And, right)
    }

    /// Creates an OR expression.
    pub fn or(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Or, right)
    }

    /// Creates an addition expression.
    pub fn add(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Add, right)
    }

    /// Creates a subtraction expression.
    pub fn sub(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Sub, right)
    }

    /// Creates a multiplication expression.
    pub fn mul(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Mul, right)
    }

    /// Creates a division expression.
    pub fn div(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Div, right)
    }

    /// Creates a NOT expression.
    pub fn not(expr: Expr) -> Self {
        Expr::UnaryOp {
            op: UnaryOp::Not,
            expr: Box::new(expr),
        }
    }

    /// Creates an IS NULL expression.
    pub fn is_null(expr: Expr) -> Self {
        Expr::UnaryOp {
            op: UnaryOp::IsNull,
            expr: Box::new(expr),
        }
    }

    /// Creates an IS NOT NULL expression.
    pub fn is_not_null(expr: Expr) -> Self {
        Expr::UnaryOp {
            op: UnaryOp::IsNotNull,
            expr: Box::new(expr),
        }
    }

    /// Creates a function call expression.
    pub fn function(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Function {
            name: name.into(),
            args,
        }
    }

    /// `ROUND(expr, scale)`.
    pub fn round(expr: Expr, scale: i64) -> Self {
        Self::function("ROUND", vec![expr, Expr::literal(scale)])
    }

    /// `COALESCE(args...)`.
    pub fn coalesce(args: Vec<Expr>) -> Self {
        Self::function("COALESCE", args)
    }

    /// `EXTRACT(YEAR FROM expr)`.
    pub fn year(expr: Expr) -> Self {
        Self::function("YEAR", vec![expr])
    }

    /// Returns the column reference if this is a plain column.
    pub fn as_column(&self) -> Option<&ColumnRef> {
        match self {
            Expr::Column(col) => Some(col),
            _ => None,
        }
    }

    /// Collects every column referenced by this expression.
    pub fn referenced_columns(&self) -> Vec<&ColumnRef> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a ColumnRef>) {
        match self {
            Expr::Column(col) => out.push(col),
            Expr::Literal(_) => {}
            Expr::BinaryOp { left, right, .. } => {
                left.collect_columns(out);
                right.collect_columns(out);
            }
            Expr::UnaryOp { expr, .. } => expr.collect_columns(out),
            Expr::Function { args, .. } => {
                for arg in args {
                    arg.collect_columns(out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_ref() {
        let col = ColumnRef::new("shipments", "qty", 5);
        assert_eq!(col.normalized_name(), "shipments.qty");
    }

    #[test]
    fn test_builders() {
        let expr = Expr::gt(
            Expr::column("parts", "plan_price", 4),
            Expr::literal(100i64),
        );
        match expr {
            Expr::BinaryOp { op, .. } => assert_eq!(op, BinaryOp::Gt),
            _ => panic!("expected binary op"),
        }

        let round = Expr::round(Expr::column("t", "x", 0), 2);
        match round {
            Expr::Function { name, args } => {
                assert_eq!(name, "ROUND");
                assert_eq!(args[1], Expr::Literal(Value::Int64(2)));
            }
            _ => panic!("expected function"),
        }
    }

    #[test]
    fn test_referenced_columns() {
        let expr = Expr::mul(
            Expr::column("shipments", "qty", 5),
            Expr::coalesce(vec![Expr::column("parts", "plan_price", 4), Expr::literal(0i64)]),
        );
        let names: Vec<String> = expr
            .referenced_columns()
            .iter()
            .map(|c| c.normalized_name())
            .collect();
        assert_eq!(names, vec!["shipments.qty", "parts.plan_price"]);
    }
}
