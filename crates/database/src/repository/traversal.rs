//! Record-based equivalents of the analytical queries.
//!
//! These load whole tables as independent reads and derive the result in
//! memory. They exist to cross-check the declarative plans and must produce
//! the same rows in the same order.

use super::Repository;
use crate::context::RequestContext;
use crate::domain::{CityShipment, Customer, Part, PartShare, QualifiedCustomer, Shipment};
use crate::error::{Error, Result};
use hashbrown::HashMap;
use rust_decimal::{Decimal, RoundingStrategy};
use std::cmp::Ordering;
use tracing::debug;

/// `qty / total * 100` rounded half away from zero to two places; 0 when the
/// partition total is zero.
pub(crate) fn share_percent(qty: Decimal, total: Decimal) -> Decimal {
    qty.checked_div(total)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|pct| pct.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .unwrap_or(Decimal::ZERO)
}

/// True if `customer_id` received `part_code` at least once and every such
/// shipment left from `warehouse`. Stops at the first shipment from elsewhere.
fn ships_only_from(
    shipments: &[Shipment],
    customer_id: i64,
    part_code: &str,
    warehouse: i64,
) -> bool {
    let mut matched = false;
    for shipment in shipments
        .iter()
        .filter(|s| s.customer_id == customer_id && s.part_code == part_code)
    {
        if shipment.warehouse_no != warehouse {
            return false;
        }
        matched = true;
    }
    matched
}

fn newest_first(a: &Shipment, b: &Shipment) -> Ordering {
    b.shipment_date
        .cmp(&a.shipment_date)
        .then_with(|| a.key().cmp(&b.key()))
}

impl Repository {
    fn customers_by_id(&self, ctx: &RequestContext) -> Result<HashMap<i64, Customer>> {
        let customers: Vec<Customer> = self.customers(ctx)?;
        Ok(customers.into_iter().map(|c| (c.customer_id, c)).collect())
    }

    /// Same rows as [`Repository::city_shipments`]: loads every shipment,
    /// resolves its customer through a map built once, filters by city.
    pub fn city_shipments_records(
        &self,
        ctx: &RequestContext,
        city: &str,
    ) -> Result<Vec<CityShipment>> {
        let city = self.resolve_city(city);
        let mut shipments: Vec<Shipment> = self.load(ctx, Vec::new())?;
        let customers = self.customers_by_id(ctx)?;

        shipments.sort_by(newest_first);
        let rows: Vec<CityShipment> = shipments
            .into_iter()
            .filter_map(|s| {
                let customer = customers.get(&s.customer_id)?;
                (customer.city == city).then(|| CityShipment {
                    warehouse_no: s.warehouse_no,
                    part_code: s.part_code,
                    shipment_date: s.shipment_date,
                    qty: s.qty,
                    customer_name: customer.name.clone(),
                })
            })
            .collect();

        debug!(city, rows = rows.len(), "city shipments (records)");
        Ok(rows)
    }

    /// Same rows as [`Repository::current_year_shares`], with partition totals
    /// accumulated in a map. A total outside the decimal range fails with the
    /// same error as the window aggregate.
    pub fn current_year_shares_records(&self, ctx: &RequestContext) -> Result<Vec<PartShare>> {
        let year = ctx.current_year();
        let shipments: Vec<Shipment> = self.load(ctx, Vec::new())?;
        let customers = self.customers_by_id(ctx)?;

        let mut current: Vec<(Shipment, &Customer)> = shipments
            .into_iter()
            .filter(|s| s.shipment_date.year() == year)
            .filter_map(|s| {
                let customer = customers.get(&s.customer_id)?;
                Some((s, customer))
            })
            .collect();

        let mut totals: HashMap<String, Decimal> = HashMap::new();
        for (s, _) in &current {
            let total = totals.entry(s.part_code.clone()).or_insert(Decimal::ZERO);
            *total = total
                .checked_add(s.qty)
                .ok_or_else(|| Error::NumericOverflow("SUM".into()))?;
        }

        current.sort_by(|(a, _), (b, _)| {
            a.part_code
                .cmp(&b.part_code)
                .then_with(|| a.key().cmp(&b.key()))
        });

        let rows: Vec<PartShare> = current
            .into_iter()
            .map(|(s, customer)| {
                let total = totals.get(&s.part_code).copied().unwrap_or(Decimal::ZERO);
                PartShare {
                    warehouse_no: s.warehouse_no,
                    share_of_total: share_percent(s.qty, total),
                    part_code: s.part_code,
                    customer_name: customer.name.clone(),
                    qty: s.qty,
                    total_part_qty: total,
                }
            })
            .collect();

        debug!(year, rows = rows.len(), "part shares (records)");
        Ok(rows)
    }

    /// Same customers as [`Repository::qualified_customers`], found by walking
    /// customers x expensive parts x shipments.
    ///
    /// Customers, parts and shipments are three independent reads; a
    /// concurrent writer can make them disagree.
    pub fn qualified_customers_records(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<QualifiedCustomer>> {
        let threshold = self.config.expensive_price_threshold;
        let warehouse = self.config.restricted_warehouse;

        let customers: Vec<Customer> = self.customers(ctx)?;
        let parts: Vec<Part> = self.parts(ctx)?;
        let expensive: Vec<String> = parts
            .into_iter()
            .filter(|p| p.plan_price > threshold)
            .map(|p| p.part_code)
            .collect();
        let shipments: Vec<Shipment> = self.load(ctx, Vec::new())?;

        let rows: Vec<QualifiedCustomer> = customers
            .into_iter()
            .filter(|c| {
                expensive
                    .iter()
                    .any(|code| ships_only_from(&shipments, c.customer_id, code, warehouse))
            })
            .map(|c| QualifiedCustomer {
                customer_id: c.customer_id,
                customer_name: c.name,
                customer_city: c.city,
            })
            .collect();

        debug!(rows = rows.len(), "qualified customers (records)");
        Ok(rows)
    }
}
