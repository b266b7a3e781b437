//! Store schema: the three base tables and the full shipment view.

use shipdb_core::schema::{Table, TableBuilder};
use shipdb_core::{DataType, Result};
use shipdb_query::ast::{Expr, SortOrder};
use shipdb_query::planner::LogicalPlan;

/// `parts` table layout.
pub mod parts {
    use shipdb_query::ast::Expr;

    pub const TABLE: &str = "parts";
    pub const COLUMNS: [&str; 5] = ["part_code", "part_type", "name", "unit", "plan_price"];

    pub const PART_CODE: usize = 0;
    pub const PART_TYPE: usize = 1;
    pub const NAME: usize = 2;
    pub const UNIT: usize = 3;
    pub const PLAN_PRICE: usize = 4;

    /// Column reference by position.
    pub fn col(index: usize) -> Expr {
        Expr::column(TABLE, COLUMNS[index], index)
    }
}

/// `customers` table layout.
pub mod customers {
    use shipdb_query::ast::Expr;

    pub const TABLE: &str = "customers";
    pub const COLUMNS: [&str; 4] = ["customer_id", "name", "address", "city"];

    pub const CUSTOMER_ID: usize = 0;
    pub const NAME: usize = 1;
    pub const ADDRESS: usize = 2;
    pub const CITY: usize = 3;

    /// Column reference by position.
    pub fn col(index: usize) -> Expr {
        Expr::column(TABLE, COLUMNS[index], index)
    }
}

/// `shipments` table layout.
pub mod shipments {
    use shipdb_query::ast::Expr;

    pub const TABLE: &str = "shipments";
    pub const COLUMNS: [&str; 7] = [
        "warehouse_no",
        "shipment_doc_no",
        "customer_id",
        "part_code",
        "unit",
        "qty",
        "shipment_date",
    ];

    pub const WAREHOUSE_NO: usize = 0;
    pub const SHIPMENT_DOC_NO: usize = 1;
    pub const CUSTOMER_ID: usize = 2;
    pub const PART_CODE: usize = 3;
    pub const UNIT: usize = 4;
    pub const QTY: usize = 5;
    pub const SHIPMENT_DATE: usize = 6;

    /// Column reference by position.
    pub fn col(index: usize) -> Expr {
        Expr::column(TABLE, COLUMNS[index], index)
    }
}

/// `v_full_shipment_info` view layout.
pub mod full_info {
    use shipdb_query::ast::Expr;

    pub const VIEW: &str = "v_full_shipment_info";
    pub const COLUMNS: [&str; 14] = [
        "warehouse_no",
        "shipment_doc_no",
        "shipment_date",
        "qty",
        "customer_id",
        "customer_name",
        "customer_address",
        "customer_city",
        "part_code",
        "part_name",
        "part_type",
        "unit",
        "plan_price",
        "total_price",
    ];

    pub const WAREHOUSE_NO: usize = 0;
    pub const SHIPMENT_DOC_NO: usize = 1;
    pub const SHIPMENT_DATE: usize = 2;

    /// Column reference by position.
    pub fn col(index: usize) -> Expr {
        Expr::column(VIEW, COLUMNS[index], index)
    }
}

fn parts_table() -> Result<Table> {
    TableBuilder::new(parts::TABLE)?
        .add_column("part_code", DataType::String)?
        .add_column("part_type", DataType::String)?
        .add_column("name", DataType::String)?
        .add_column("unit", DataType::String)?
        .add_column("plan_price", DataType::Decimal)?
        .add_primary_key(&["part_code"], false)?
        .add_non_negative("plan_price")?
        .build()
}

fn customers_table() -> Result<Table> {
    TableBuilder::new(customers::TABLE)?
        .add_column("customer_id", DataType::Int64)?
        .add_column("name", DataType::String)?
        .add_column("address", DataType::String)?
        .add_column("city", DataType::String)?
        .add_primary_key(&["customer_id"], true)?
        .add_index("idx_customers_city", &["city"], false)?
        .build()
}

fn shipments_table() -> Result<Table> {
    TableBuilder::new(shipments::TABLE)?
        .add_column("warehouse_no", DataType::Int64)?
        .add_column("shipment_doc_no", DataType::Int64)?
        .add_column("customer_id", DataType::Int64)?
        .add_column("part_code", DataType::String)?
        .add_column("unit", DataType::String)?
        .add_column("qty", DataType::Decimal)?
        .add_column("shipment_date", DataType::Date)?
        .add_primary_key(&["warehouse_no", "shipment_doc_no"], false)?
        .add_foreign_key("fk_shipments_customer", "customer_id", customers::TABLE, "customer_id")?
        .add_foreign_key("fk_shipments_part", "part_code", parts::TABLE, "part_code")?
        .add_non_negative("qty")?
        .build()
}

/// Base tables in creation order (parents before children).
pub fn tables() -> Result<Vec<Table>> {
    Ok(vec![parts_table()?, customers_table()?, shipments_table()?])
}

/// Defining plan of `v_full_shipment_info`: every shipment with its customer,
/// its part and `total_price = qty * plan_price`.
pub fn full_shipment_info_view() -> LogicalPlan {
    let joined = LogicalPlan::inner_join(
        LogicalPlan::inner_join(
            LogicalPlan::scan(shipments::TABLE),
            LogicalPlan::scan(customers::TABLE),
            vec![(
                shipments::col(shipments::CUSTOMER_ID),
                customers::col(customers::CUSTOMER_ID),
            )],
        ),
        LogicalPlan::scan(parts::TABLE),
        vec![(shipments::col(shipments::PART_CODE), parts::col(parts::PART_CODE))],
    );

    LogicalPlan::project(
        joined,
        vec![
            shipments::col(shipments::WAREHOUSE_NO),
            shipments::col(shipments::SHIPMENT_DOC_NO),
            shipments::col(shipments::SHIPMENT_DATE),
            shipments::col(shipments::QTY),
            customers::col(customers::CUSTOMER_ID),
            customers::col(customers::NAME),
            customers::col(customers::ADDRESS),
            customers::col(customers::CITY),
            parts::col(parts::PART_CODE),
            parts::col(parts::NAME),
            parts::col(parts::PART_TYPE),
            parts::col(parts::UNIT),
            parts::col(parts::PLAN_PRICE),
            Expr::mul(
                shipments::col(shipments::QTY),
                parts::col(parts::PLAN_PRICE),
            ),
        ],
        full_info::VIEW,
    )
}

/// Named views registered at bootstrap.
pub fn views() -> Vec<(&'static str, LogicalPlan)> {
    vec![(full_info::VIEW, full_shipment_info_view())]
}

/// Newest shipments first; equal dates fall back to the shipment key.
pub fn full_info_order() -> Vec<(Expr, SortOrder)> {
    vec![
        (full_info::col(full_info::SHIPMENT_DATE), SortOrder::Desc),
        (full_info::col(full_info::WAREHOUSE_NO), SortOrder::Asc),
        (full_info::col(full_info::SHIPMENT_DOC_NO), SortOrder::Asc),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_layouts_match_tables() {
        let tables = tables().unwrap();
        let layouts: [&[&str]; 3] = [&parts::COLUMNS, &customers::COLUMNS, &shipments::COLUMNS];
        for (table, layout) in tables.iter().zip(layouts) {
            let names: Vec<&str> = table.columns().iter().map(|c| c.name()).collect();
            assert_eq!(names, layout, "layout of {}", table.name());
        }
    }

    #[test]
    fn test_shipments_constraints() {
        let tables = tables().unwrap();
        let shipments = &tables[2];
        assert_eq!(shipments.primary_key_positions(), vec![0, 1]);
        assert_eq!(shipments.constraints().get_foreign_keys().len(), 2);
        assert_eq!(shipments.constraints().get_checks().len(), 1);
    }

    #[test]
    fn test_customer_id_is_auto_increment() {
        let tables = tables().unwrap();
        let pk = tables[1].primary_key().unwrap();
        assert!(pk.is_auto_increment());
    }

    #[test]
    fn test_view_reads_all_base_tables() {
        let view = full_shipment_info_view();
        let mut scanned = view.scanned_tables();
        scanned.sort_unstable();
        assert_eq!(scanned, vec!["customers", "parts", "shipments"]);
    }
}
