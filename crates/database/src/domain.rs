//! Domain records: base entities and query results.
//!
//! Every record serializes as a flat object. Decimals serialize as strings so
//! no precision is lost, dates as `YYYY-MM-DD`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

/// A part from the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub part_code: String,
    pub part_type: String,
    pub name: String,
    pub unit: String,
    pub plan_price: Decimal,
}

/// A customer. `customer_id` is assigned by the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: i64,
    pub name: String,
    pub address: String,
    pub city: String,
}

/// Fields of a customer that does not exist yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub address: String,
    pub city: String,
}

/// A shipment, keyed by `(warehouse_no, shipment_doc_no)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipment {
    pub warehouse_no: i64,
    pub shipment_doc_no: i64,
    pub customer_id: i64,
    pub part_code: String,
    pub unit: String,
    pub qty: Decimal,
    pub shipment_date: Date,
}

impl Shipment {
    /// Returns the composite key.
    pub fn key(&self) -> (i64, i64) {
        (self.warehouse_no, self.shipment_doc_no)
    }
}

/// A shipment joined with its customer and part.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullShipmentInfo {
    pub warehouse_no: i64,
    pub shipment_doc_no: i64,
    pub shipment_date: Date,
    pub qty: Decimal,
    pub customer_id: i64,
    pub customer_name: String,
    pub customer_address: String,
    pub customer_city: String,
    pub part_code: String,
    pub part_name: String,
    pub part_type: String,
    pub unit: String,
    pub plan_price: Decimal,
    /// `qty * plan_price`
    pub total_price: Decimal,
}

/// A shipment to a customer of the requested city.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityShipment {
    pub warehouse_no: i64,
    pub part_code: String,
    pub shipment_date: Date,
    pub qty: Decimal,
    pub customer_name: String,
}

/// A current-year shipment with its share of the part's total quantity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartShare {
    pub warehouse_no: i64,
    pub part_code: String,
    pub customer_name: String,
    pub qty: Decimal,
    /// Sum of `qty` over the current-year shipments of the same part.
    pub total_part_qty: Decimal,
    /// `qty / total_part_qty * 100`, two decimal places.
    pub share_of_total: Decimal,
}

/// A customer that receives some expensive part only from the restricted warehouse.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualifiedCustomer {
    pub customer_id: i64,
    pub customer_name: String,
    pub customer_city: String,
}

/// Shipped totals of one customer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub total_qty: Decimal,
    pub total_value: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_shipment_serializes_flat() {
        let shipment = Shipment {
            warehouse_no: 5,
            shipment_doc_no: 1,
            customer_id: 1,
            part_code: "P1".into(),
            unit: "pcs".into(),
            qty: Decimal::new(105, 1),
            shipment_date: date!(2024 - 03 - 01),
        };
        let json = serde_json::to_value(&shipment).unwrap();
        assert_eq!(json["warehouse_no"], 5);
        assert_eq!(json["qty"], "10.5");
        assert_eq!(json["shipment_date"], "2024-03-01");

        let back: Shipment = serde_json::from_value(json).unwrap();
        assert_eq!(back, shipment);
    }

    #[test]
    fn test_summary_field_names() {
        let summary = CustomerSummary {
            total_qty: Decimal::from(5),
            total_value: Decimal::from(130),
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert_eq!(json, r#"{"total_qty":"5","total_value":"130"}"#);
    }
}
