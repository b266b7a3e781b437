//! Declarative query plans.
//!
//! Each builder returns a complete plan whose projected columns match the
//! decoding order of the corresponding result record. Parameters are bound as
//! literals, never spliced into identifiers.

use crate::schema::{customers, parts, shipments};
use rust_decimal::Decimal;
use shipdb_query::ast::{AggregateFunc, Expr, SortOrder};
use shipdb_query::planner::LogicalPlan;

fn shipments_with_customers() -> LogicalPlan {
    LogicalPlan::inner_join(
        LogicalPlan::scan(shipments::TABLE),
        LogicalPlan::scan(customers::TABLE),
        vec![(
            shipments::col(shipments::CUSTOMER_ID),
            customers::col(customers::CUSTOMER_ID),
        )],
    )
}

/// Newest first; equal dates by ascending shipment key.
pub fn newest_shipments_first() -> Vec<(Expr, SortOrder)> {
    vec![
        (shipments::col(shipments::SHIPMENT_DATE), SortOrder::Desc),
        (shipments::col(shipments::WAREHOUSE_NO), SortOrder::Asc),
        (shipments::col(shipments::SHIPMENT_DOC_NO), SortOrder::Asc),
    ]
}

/// Shipments to customers of `city`, newest first.
///
/// Columns: warehouse_no, part_code, shipment_date, qty, customer_name.
pub fn city_shipments(city: &str) -> LogicalPlan {
    let filtered = LogicalPlan::filter(
        shipments_with_customers(),
        Expr::eq(customers::col(customers::CITY), Expr::literal(city)),
    );

    LogicalPlan::project(
        LogicalPlan::sort(filtered, newest_shipments_first()),
        vec![
            shipments::col(shipments::WAREHOUSE_NO),
            shipments::col(shipments::PART_CODE),
            shipments::col(shipments::SHIPMENT_DATE),
            shipments::col(shipments::QTY),
            customers::col(customers::NAME),
        ],
        "city_shipments",
    )
}

/// Shipments of `year` with each row's share of its part's total quantity:
///
/// ```sql
/// SUM(qty) OVER (PARTITION BY part_code) AS total_part_qty,
/// COALESCE(ROUND(qty / total_part_qty * 100, 2), 0) AS share_of_total
/// ```
///
/// Ordered by part code, then warehouse number, then document number.
/// Columns: warehouse_no, part_code, customer_name, qty, total_part_qty,
/// share_of_total.
pub fn part_shares(year: i32) -> LogicalPlan {
    let current = LogicalPlan::filter(
        shipments_with_customers(),
        Expr::eq(
            Expr::year(shipments::col(shipments::SHIPMENT_DATE)),
            Expr::literal(i64::from(year)),
        ),
    );

    let windowed = LogicalPlan::window(
        current,
        vec![shipments::col(shipments::PART_CODE)],
        AggregateFunc::Sum,
        shipments::col(shipments::QTY),
        "part_totals",
    );

    let sorted = LogicalPlan::sort(
        windowed,
        vec![
            (shipments::col(shipments::PART_CODE), SortOrder::Asc),
            (shipments::col(shipments::WAREHOUSE_NO), SortOrder::Asc),
            (shipments::col(shipments::SHIPMENT_DOC_NO), SortOrder::Asc),
        ],
    );

    let total = Expr::column("part_totals", "total_part_qty", 0);
    // Zero-quantity partitions divide by zero, which yields null, hence 0.
    let share = Expr::coalesce(vec![
        Expr::round(
            Expr::mul(
                Expr::div(shipments::col(shipments::QTY), total.clone()),
                Expr::literal(100i64),
            ),
            2,
        ),
        Expr::literal(Decimal::ZERO),
    ]);

    LogicalPlan::project(
        sorted,
        vec![
            shipments::col(shipments::WAREHOUSE_NO),
            shipments::col(shipments::PART_CODE),
            customers::col(customers::NAME),
            shipments::col(shipments::QTY),
            total,
            share,
        ],
        "part_shares",
    )
}

/// Customers for which some part priced above `threshold` was shipped to
/// them, and only ever from `warehouse`:
///
/// ```sql
/// EXISTS (part p WHERE price > threshold
///     AND EXISTS (shipment of p to c)
///     AND NOT EXISTS (shipment of p to c WHERE warehouse_no <> warehouse))
/// ```
///
/// The nested quantifiers are decorrelated into a semi join over the anti
/// join of (customer, expensive part) pairs. Ordered by customer id.
/// Columns: customer_id, customer_name, customer_city.
pub fn qualified_customers(threshold: Decimal, warehouse: i64) -> LogicalPlan {
    let expensive_pairs = LogicalPlan::distinct(LogicalPlan::project(
        LogicalPlan::filter(
            LogicalPlan::inner_join(
                LogicalPlan::scan(shipments::TABLE),
                LogicalPlan::scan(parts::TABLE),
                vec![(shipments::col(shipments::PART_CODE), parts::col(parts::PART_CODE))],
            ),
            Expr::gt(parts::col(parts::PLAN_PRICE), Expr::literal(threshold)),
        ),
        vec![
            shipments::col(shipments::CUSTOMER_ID),
            shipments::col(shipments::PART_CODE),
        ],
        "pairs",
    ));
    let pair_customer = Expr::column("pairs", "customer_id", 0);
    let pair_part = Expr::column("pairs", "part_code", 1);

    let elsewhere = LogicalPlan::filter(
        LogicalPlan::scan(shipments::TABLE),
        Expr::ne(
            shipments::col(shipments::WAREHOUSE_NO),
            Expr::literal(warehouse),
        ),
    );

    let exclusive_pairs = LogicalPlan::anti_join(
        expensive_pairs,
        elsewhere,
        vec![
            (pair_customer.clone(), shipments::col(shipments::CUSTOMER_ID)),
            (pair_part, shipments::col(shipments::PART_CODE)),
        ],
    );

    let qualified = LogicalPlan::semi_join(
        LogicalPlan::scan(customers::TABLE),
        exclusive_pairs,
        vec![(customers::col(customers::CUSTOMER_ID), pair_customer)],
    );

    LogicalPlan::sort(
        LogicalPlan::project(
            qualified,
            vec![
                customers::col(customers::CUSTOMER_ID),
                customers::col(customers::NAME),
                customers::col(customers::CITY),
            ],
            "qualified_customers",
        ),
        vec![(
            Expr::column("qualified_customers", "customer_id", 0),
            SortOrder::Asc,
        )],
    )
}

/// Total quantity and total value (`qty * plan_price`) shipped to one
/// customer, zero when there is nothing to sum.
/// Columns: total_qty, total_value.
pub fn customer_summary(customer_id: i64) -> LogicalPlan {
    let lines = LogicalPlan::project(
        LogicalPlan::inner_join(
            LogicalPlan::filter(
                LogicalPlan::scan(shipments::TABLE),
                Expr::eq(
                    shipments::col(shipments::CUSTOMER_ID),
                    Expr::literal(customer_id),
                ),
            ),
            LogicalPlan::scan(parts::TABLE),
            vec![(shipments::col(shipments::PART_CODE), parts::col(parts::PART_CODE))],
        ),
        vec![
            shipments::col(shipments::QTY),
            Expr::mul(
                shipments::col(shipments::QTY),
                parts::col(parts::PLAN_PRICE),
            ),
        ],
        "lines",
    );

    let totals = LogicalPlan::aggregate(
        lines,
        vec![],
        vec![
            (AggregateFunc::Sum, Expr::column("lines", "qty", 0)),
            (AggregateFunc::Sum, Expr::column("lines", "value", 1)),
        ],
        "totals",
    );

    LogicalPlan::project(
        totals,
        vec![
            Expr::coalesce(vec![
                Expr::column("totals", "total_qty", 0),
                Expr::literal(Decimal::ZERO),
            ]),
            Expr::coalesce(vec![
                Expr::column("totals", "total_value", 1),
                Expr::literal(Decimal::ZERO),
            ]),
        ],
        "customer_summary",
    )
}
