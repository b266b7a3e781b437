//! Logical query plan definitions.

use crate::ast::{AggregateFunc, Expr, SortOrder};

/// Join flavour.
///
/// Semi and anti joins keep only the left columns: a semi join emits each left
/// row that has at least one match, an anti join each left row that has none.
/// They are the decorrelated forms of `EXISTS` and `NOT EXISTS`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Semi,
    Anti,
}

/// Logical query plan node.
#[derive(Clone, Debug, PartialEq)]
pub enum LogicalPlan {
    /// Table or view scan.
    Scan { table: String },

    /// Filter (WHERE clause).
    Filter {
        input: Box<LogicalPlan>,
        predicate: Expr,
    },

    /// Projection (SELECT list). The output is a single table named `alias`.
    Project {
        input: Box<LogicalPlan>,
        columns: Vec<Expr>,
        alias: String,
    },

    /// Equi-join on one or more key pairs `(left expr, right expr)`.
    Join {
        left: Box<LogicalPlan>,
        right: Box<LogicalPlan>,
        on: Vec<(Expr, Expr)>,
        kind: JoinKind,
    },

    /// Window aggregate: `func(arg) OVER (PARTITION BY partition_by)`.
    /// Appends one column, addressed as `alias` index 0.
    Window {
        input: Box<LogicalPlan>,
        partition_by: Vec<Expr>,
        func: AggregateFunc,
        arg: Expr,
        alias: String,
    },

    /// Aggregation (GROUP BY). Output columns are the group keys followed by
    /// the aggregates, as a single table named `alias`.
    Aggregate {
        input: Box<LogicalPlan>,
        group_by: Vec<Expr>,
        aggregates: Vec<(AggregateFunc, Expr)>,
        alias: String,
    },

    /// Duplicate elimination over whole rows, keeping first occurrences.
    Distinct { input: Box<LogicalPlan> },

    /// Sort (ORDER BY). Stable.
    Sort {
        input: Box<LogicalPlan>,
        order_by: Vec<(Expr, SortOrder)>,
    },
}

impl LogicalPlan {
    /// Creates a table scan plan.
    pub fn scan(table: impl Into<String>) -> Self {
        LogicalPlan::Scan {
            table: table.into(),
        }
    }

    /// Creates a filter plan.
    pub fn filter(input: LogicalPlan, predicate: Expr) -> Self {
        LogicalPlan::Filter {
            input: Box::new(input),
            predicate,
        }
    }

    /// Creates a projection plan.
    pub fn project(input: LogicalPlan, columns: Vec<Expr>, alias: impl Into<String>) -> Self {
        LogicalPlan::Project {
            input: Box::new(input),
            columns,
            alias: alias.into(),
        }
    }

    /// Creates a join plan.
    pub fn join(left: LogicalPlan, right: LogicalPlan, on: Vec<(Expr, Expr)>, kind: JoinKind) -> Self {
        LogicalPlan::Join {
            left: Box::new(left),
            right: Box::new(right),
            on,
            kind,
        }
    }

    /// Creates an inner join plan.
    pub fn inner_join(left: LogicalPlan, right: LogicalPlan, on: Vec<(Expr, Expr)>) -> Self {
        Self::join(left, right, on, JoinKind::Inner)
    }

    /// Creates a semi join plan (`EXISTS`).
    pub fn semi_join(left: LogicalPlan, right: LogicalPlan, on: Vec<(Expr, Expr)>) -> Self {
        Self::join(left, right, on, JoinKind::Semi)
    }

    /// Creates an anti join plan (`NOT EXISTS`).
    pub fn anti_join(left: LogicalPlan, right: LogicalPlan, on: Vec<(Expr, Expr)>) -> Self {
        Self::join(left, right, on, JoinKind::Anti)
    }

    /// Creates a window aggregate plan.
    pub fn window(
        input: LogicalPlan,
        partition_by: Vec<Expr>,
        func: AggregateFunc,
        arg: Expr,
        alias: impl Into<String>,
    ) -> Self {
        LogicalPlan::Window {
            input: Box::new(input),
            partition_by,
            func,
            arg,
            alias: alias.into(),
        }
    }

    /// Creates an aggregation plan.
    pub fn aggregate(
        input: LogicalPlan,
        group_by: Vec<Expr>,
        aggregates: Vec<(AggregateFunc, Expr)>,
        alias: impl Into<String>,
    ) -> Self {
        LogicalPlan::Aggregate {
            input: Box::new(input),
            group_by,
            aggregates,
            alias: alias.into(),
        }
    }

    /// Creates a distinct plan.
    pub fn distinct(input: LogicalPlan) -> Self {
        LogicalPlan::Distinct {
            input: Box::new(input),
        }
    }

    /// Creates a sort plan.
    pub fn sort(input: LogicalPlan, order_by: Vec<(Expr, SortOrder)>) -> Self {
        LogicalPlan::Sort {
            input: Box::new(input),
            order_by,
        }
    }

    /// Returns the input plan(s) of this node.
    pub fn inputs(&self) -> Vec<&LogicalPlan> {
        match self {
            LogicalPlan::Scan { .. } => vec![],
            LogicalPlan::Filter { input, .. }
            | LogicalPlan::Project { input, .. }
            | LogicalPlan::Window { input, .. }
            | LogicalPlan::Aggregate { input, .. }
            | LogicalPlan::Distinct { input }
            | LogicalPlan::Sort { input, .. } => vec![input.as_ref()],
            LogicalPlan::Join { left, right, .. } => vec![left.as_ref(), right.as_ref()],
        }
    }

    /// Returns every table or view name scanned by this plan.
    pub fn scanned_tables(&self) -> Vec<&str> {
        match self {
            LogicalPlan::Scan { table } => vec![table.as_str()],
            _ => self
                .inputs()
                .into_iter()
                .flat_map(|p| p.scanned_tables())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_plan_builders() {
        let scan = LogicalPlan::scan("customers");
        assert!(matches!(scan, LogicalPlan::Scan { ref table } if table == "customers"));

        let filter = LogicalPlan::filter(
            LogicalPlan::scan("customers"),
            Expr::eq(Expr::column("customers", "city", 3), Expr::literal("Казань")),
        );
        assert!(matches!(filter, LogicalPlan::Filter { .. }));

        let project = LogicalPlan::project(
            LogicalPlan::scan("customers"),
            vec![Expr::column("customers", "name", 1)],
            "names",
        );
        assert!(matches!(project, LogicalPlan::Project { ref alias, .. } if alias == "names"));
    }

    #[test]
    fn test_logical_plan_inputs() {
        let scan = LogicalPlan::scan("parts");
        assert!(scan.inputs().is_empty());

        let join = LogicalPlan::anti_join(
            LogicalPlan::scan("customers"),
            LogicalPlan::scan("shipments"),
            vec![(
                Expr::column("customers", "customer_id", 0),
                Expr::column("shipments", "customer_id", 2),
            )],
        );
        assert_eq!(join.inputs().len(), 2);
        assert_eq!(join.scanned_tables(), vec!["customers", "shipments"]);
    }
}
