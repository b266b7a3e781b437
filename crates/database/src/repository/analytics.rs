//! Declarative analytical queries: each runs as one plan in one store read.

use super::{plans, Repository};
use crate::context::RequestContext;
use crate::domain::{CityShipment, CustomerSummary, PartShare, QualifiedCustomer};
use crate::error::{Error, Result};
use shipdb_query::executor::ExecutionError;
use tracing::debug;

impl Repository {
    /// Returns `city` unless it is empty, in which case the configured default.
    pub(crate) fn resolve_city<'a>(&'a self, city: &'a str) -> &'a str {
        if city.is_empty() {
            &self.config.default_city
        } else {
            city
        }
    }

    /// Shipments to customers of `city`, newest first, via a join with the
    /// city predicate evaluated by the store.
    pub fn city_shipments(&self, ctx: &RequestContext, city: &str) -> Result<Vec<CityShipment>> {
        let city = self.resolve_city(city);
        let rows: Vec<CityShipment> = self.query(ctx, &plans::city_shipments(city))?;
        debug!(city, rows = rows.len(), "city shipments (declarative)");
        Ok(rows)
    }

    /// Current-year shipments with their share of the part's total quantity,
    /// via a window aggregate.
    ///
    /// Shares are rounded half away from zero to two decimal places.
    pub fn current_year_shares(&self, ctx: &RequestContext) -> Result<Vec<PartShare>> {
        let year = ctx.current_year();
        let rows: Vec<PartShare> = self.query(ctx, &plans::part_shares(year))?;
        debug!(year, rows = rows.len(), "part shares (declarative)");
        Ok(rows)
    }

    /// Customers receiving some expensive part exclusively from the restricted
    /// warehouse, via semi and anti joins.
    pub fn qualified_customers(&self, ctx: &RequestContext) -> Result<Vec<QualifiedCustomer>> {
        let plan = plans::qualified_customers(
            self.config.expensive_price_threshold,
            self.config.restricted_warehouse,
        );
        let rows: Vec<QualifiedCustomer> = self.query(ctx, &plan)?;
        debug!(rows = rows.len(), "qualified customers (declarative)");
        Ok(rows)
    }

    /// Total quantity and value shipped to a customer, as one atomic read.
    ///
    /// A customer without shipments, or an unknown id, yields zero totals.
    /// A line value or total outside the decimal range fails the whole read.
    pub fn customer_summary(&self, ctx: &RequestContext, customer_id: i64) -> Result<CustomerSummary> {
        let rows: Vec<CustomerSummary> = self.query(ctx, &plans::customer_summary(customer_id))?;
        let summary = rows.into_iter().next().ok_or_else(|| {
            Error::Query(ExecutionError::InvalidOperation(
                "customer summary produced no row".into(),
            ))
        })?;
        debug!(customer_id, ?summary, "customer summary");
        Ok(summary)
    }
}
