//! Single-table CRUD entry points.

use super::{plans, Repository};
use crate::context::RequestContext;
use crate::convert::{FromValues, TableRecord};
use crate::domain::{Customer, FullShipmentInfo, NewCustomer, Part, Shipment};
use crate::error::Result;
use crate::schema::{self, customers, full_info};
use shipdb_core::Value;
use shipdb_query::planner::LogicalPlan;
use tracing::debug;

impl Repository {
    /// Lists parts ordered by part code.
    pub fn parts(&self, ctx: &RequestContext) -> Result<Vec<Part>> {
        self.load(ctx, Vec::new())
    }

    /// Creates a part.
    pub fn create_part(&self, ctx: &RequestContext, part: &Part) -> Result<()> {
        self.insert_record(ctx, part)
    }

    /// Updates the part with `part.part_code`. Returns the number of rows changed.
    pub fn update_part(&self, ctx: &RequestContext, part: &Part) -> Result<usize> {
        self.update_record(ctx, part)
    }

    /// Deletes a part. Fails while shipments still reference it.
    pub fn delete_part(&self, ctx: &RequestContext, part_code: &str) -> Result<usize> {
        self.delete_key::<Part>(ctx, vec![Value::from(part_code)])
    }

    /// Lists customers ordered by id.
    pub fn customers(&self, ctx: &RequestContext) -> Result<Vec<Customer>> {
        self.load(ctx, Vec::new())
    }

    /// Creates a customer. The id is assigned by the store.
    pub fn create_customer(&self, ctx: &RequestContext, customer: &NewCustomer) -> Result<Customer> {
        ctx.check()?;
        let values = vec![
            Value::Null,
            Value::from(customer.name.as_str()),
            Value::from(customer.address.as_str()),
            Value::from(customer.city.as_str()),
        ];
        let row = self.db.write(|cache| cache.insert(customers::TABLE, values))?;
        let created = Customer::from_values(row.values())?;
        debug!(customer_id = created.customer_id, "customer created");
        Ok(created)
    }

    /// Updates the customer with `customer.customer_id`. Returns the number of rows changed.
    pub fn update_customer(&self, ctx: &RequestContext, customer: &Customer) -> Result<usize> {
        self.update_record(ctx, customer)
    }

    /// Deletes a customer. Fails while shipments still reference it.
    pub fn delete_customer(&self, ctx: &RequestContext, customer_id: i64) -> Result<usize> {
        self.delete_key::<Customer>(ctx, vec![Value::Int64(customer_id)])
    }

    /// Lists shipments, newest first.
    pub fn shipments(&self, ctx: &RequestContext) -> Result<Vec<Shipment>> {
        self.load(ctx, plans::newest_shipments_first())
    }

    /// Creates a shipment. Its customer and part must exist.
    pub fn create_shipment(&self, ctx: &RequestContext, shipment: &Shipment) -> Result<()> {
        self.insert_record(ctx, shipment)
    }

    /// Updates the shipment with the same composite key. Returns the number of rows changed.
    pub fn update_shipment(&self, ctx: &RequestContext, shipment: &Shipment) -> Result<usize> {
        self.update_record(ctx, shipment)
    }

    /// Deletes a shipment by its composite key.
    pub fn delete_shipment(
        &self,
        ctx: &RequestContext,
        warehouse_no: i64,
        shipment_doc_no: i64,
    ) -> Result<usize> {
        self.delete_key::<Shipment>(
            ctx,
            vec![Value::Int64(warehouse_no), Value::Int64(shipment_doc_no)],
        )
    }

    /// Lists every shipment joined with its customer and part, newest first.
    pub fn full_shipment_info(&self, ctx: &RequestContext) -> Result<Vec<FullShipmentInfo>> {
        let plan = LogicalPlan::sort(LogicalPlan::scan(full_info::VIEW), schema::full_info_order());
        self.query(ctx, &plan)
    }

    fn insert_record<T: TableRecord>(&self, ctx: &RequestContext, record: &T) -> Result<()> {
        ctx.check()?;
        self.db.write(|cache| cache.insert(T::TABLE, record.to_values()))?;
        debug!(table = T::TABLE, "row inserted");
        Ok(())
    }

    fn update_record<T: TableRecord>(&self, ctx: &RequestContext, record: &T) -> Result<usize> {
        ctx.check()?;
        let changed = self
            .db
            .write(|cache| cache.update_by_pk(T::TABLE, &record.key(), record.to_values()))?;
        debug!(table = T::TABLE, changed, "row updated");
        Ok(changed)
    }

    fn delete_key<T: TableRecord>(&self, ctx: &RequestContext, key: Vec<Value>) -> Result<usize> {
        ctx.check()?;
        let removed = self.db.write(|cache| cache.delete_by_pk(T::TABLE, &key))?;
        debug!(table = T::TABLE, removed, "row deleted");
        Ok(removed)
    }
}
