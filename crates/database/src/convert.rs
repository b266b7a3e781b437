//! Conversion between domain records and store rows.

use crate::domain::{
    CityShipment, Customer, CustomerSummary, FullShipmentInfo, Part, PartShare,
    QualifiedCustomer, Shipment,
};
use crate::schema::{customers, full_info, parts, shipments};
use rust_decimal::Decimal;
use shipdb_core::{DataType, Date, Error, Result, Value};

/// A record decoded from a row of values in a fixed column order.
pub trait FromValues: Sized {
    /// Column names in value order, for error messages.
    const COLUMNS: &'static [&'static str];

    /// Decodes a record from a row.
    fn from_values(values: &[Value]) -> Result<Self>;
}

/// A record stored in a base table.
pub trait TableRecord: FromValues {
    /// Table name.
    const TABLE: &'static str;

    /// Encodes the record in native column order.
    fn to_values(&self) -> Vec<Value>;

    /// Returns the primary key values.
    fn key(&self) -> Vec<Value>;
}

/// Typed access to the fields of a row.
struct Fields<'a> {
    columns: &'a [&'a str],
    values: &'a [Value],
}

impl<'a> Fields<'a> {
    fn new(columns: &'a [&'a str], values: &'a [Value]) -> Self {
        Self { columns, values }
    }

    fn name(&self, idx: usize) -> &str {
        self.columns.get(idx).copied().unwrap_or("?")
    }

    fn get(&self, idx: usize, expected: DataType) -> Result<&'a Value> {
        match self.values.get(idx) {
            None | Some(Value::Null) => Err(Error::null_constraint(self.name(idx))),
            Some(value) => match value.data_type() {
                Some(got) if got == expected => Ok(value),
                Some(got) => Err(Error::type_mismatch(self.name(idx), expected, got)),
                None => Err(Error::null_constraint(self.name(idx))),
            },
        }
    }

    fn string(&self, idx: usize) -> Result<String> {
        Ok(self
            .get(idx, DataType::String)?
            .as_str()
            .unwrap_or_default()
            .to_string())
    }

    fn int(&self, idx: usize) -> Result<i64> {
        Ok(self.get(idx, DataType::Int64)?.as_i64().unwrap_or_default())
    }

    /// Decimal columns also accept integers, which widen losslessly.
    fn decimal(&self, idx: usize) -> Result<Decimal> {
        match self.values.get(idx) {
            Some(Value::Int64(i)) => Ok(Decimal::from(*i)),
            _ => Ok(self
                .get(idx, DataType::Decimal)?
                .as_decimal()
                .unwrap_or_default()),
        }
    }

    fn date(&self, idx: usize) -> Result<Date> {
        self.get(idx, DataType::Date)?
            .as_date()
            .ok_or_else(|| Error::null_constraint(self.name(idx)))
    }
}

impl FromValues for Part {
    const COLUMNS: &'static [&'static str] = &parts::COLUMNS;

    fn from_values(values: &[Value]) -> Result<Self> {
        let f = Fields::new(Self::COLUMNS, values);
        Ok(Part {
            part_code: f.string(parts::PART_CODE)?,
            part_type: f.string(parts::PART_TYPE)?,
            name: f.string(parts::NAME)?,
            unit: f.string(parts::UNIT)?,
            plan_price: f.decimal(parts::PLAN_PRICE)?,
        })
    }
}

impl TableRecord for Part {
    const TABLE: &'static str = parts::TABLE;

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::from(self.part_code.as_str()),
            Value::from(self.part_type.as_str()),
            Value::from(self.name.as_str()),
            Value::from(self.unit.as_str()),
            Value::Decimal(self.plan_price),
        ]
    }

    fn key(&self) -> Vec<Value> {
        vec![Value::from(self.part_code.as_str())]
    }
}

impl FromValues for Customer {
    const COLUMNS: &'static [&'static str] = &customers::COLUMNS;

    fn from_values(values: &[Value]) -> Result<Self> {
        let f = Fields::new(Self::COLUMNS, values);
        Ok(Customer {
            customer_id: f.int(customers::CUSTOMER_ID)?,
            name: f.string(customers::NAME)?,
            address: f.string(customers::ADDRESS)?,
            city: f.string(customers::CITY)?,
        })
    }
}

impl TableRecord for Customer {
    const TABLE: &'static str = customers::TABLE;

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Int64(self.customer_id),
            Value::from(self.name.as_str()),
            Value::from(self.address.as_str()),
            Value::from(self.city.as_str()),
        ]
    }

    fn key(&self) -> Vec<Value> {
        vec![Value::Int64(self.customer_id)]
    }
}

impl FromValues for Shipment {
    const COLUMNS: &'static [&'static str] = &shipments::COLUMNS;

    fn from_values(values: &[Value]) -> Result<Self> {
        let f = Fields::new(Self::COLUMNS, values);
        Ok(Shipment {
            warehouse_no: f.int(shipments::WAREHOUSE_NO)?,
            shipment_doc_no: f.int(shipments::SHIPMENT_DOC_NO)?,
            customer_id: f.int(shipments::CUSTOMER_ID)?,
            part_code: f.string(shipments::PART_CODE)?,
            unit: f.string(shipments::UNIT)?,
            qty: f.decimal(shipments::QTY)?,
            shipment_date: f.date(shipments::SHIPMENT_DATE)?,
        })
    }
}

impl TableRecord for Shipment {
    const TABLE: &'static str = shipments::TABLE;

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Int64(self.warehouse_no),
            Value::Int64(self.shipment_doc_no),
            Value::Int64(self.customer_id),
            Value::from(self.part_code.as_str()),
            Value::from(self.unit.as_str()),
            Value::Decimal(self.qty),
            Value::Date(self.shipment_date),
        ]
    }

    fn key(&self) -> Vec<Value> {
        vec![Value::Int64(self.warehouse_no), Value::Int64(self.shipment_doc_no)]
    }
}

impl FromValues for FullShipmentInfo {
    const COLUMNS: &'static [&'static str] = &full_info::COLUMNS;

    fn from_values(values: &[Value]) -> Result<Self> {
        let f = Fields::new(Self::COLUMNS, values);
        Ok(FullShipmentInfo {
            warehouse_no: f.int(0)?,
            shipment_doc_no: f.int(1)?,
            shipment_date: f.date(2)?,
            qty: f.decimal(3)?,
            customer_id: f.int(4)?,
            customer_name: f.string(5)?,
            customer_address: f.string(6)?,
            customer_city: f.string(7)?,
            part_code: f.string(8)?,
            part_name: f.string(9)?,
            part_type: f.string(10)?,
            unit: f.string(11)?,
            plan_price: f.decimal(12)?,
            total_price: f.decimal(13)?,
        })
    }
}

impl FromValues for CityShipment {
    const COLUMNS: &'static [&'static str] = &[
        "warehouse_no",
        "part_code",
        "shipment_date",
        "qty",
        "customer_name",
    ];

    fn from_values(values: &[Value]) -> Result<Self> {
        let f = Fields::new(Self::COLUMNS, values);
        Ok(CityShipment {
            warehouse_no: f.int(0)?,
            part_code: f.string(1)?,
            shipment_date: f.date(2)?,
            qty: f.decimal(3)?,
            customer_name: f.string(4)?,
        })
    }
}

impl FromValues for PartShare {
    const COLUMNS: &'static [&'static str] = &[
        "warehouse_no",
        "part_code",
        "customer_name",
        "qty",
        "total_part_qty",
        "share_of_total",
    ];

    fn from_values(values: &[Value]) -> Result<Self> {
        let f = Fields::new(Self::COLUMNS, values);
        Ok(PartShare {
            warehouse_no: f.int(0)?,
            part_code: f.string(1)?,
            customer_name: f.string(2)?,
            qty: f.decimal(3)?,
            total_part_qty: f.decimal(4)?,
            share_of_total: f.decimal(5)?,
        })
    }
}

impl FromValues for QualifiedCustomer {
    const COLUMNS: &'static [&'static str] = &["customer_id", "customer_name", "customer_city"];

    fn from_values(values: &[Value]) -> Result<Self> {
        let f = Fields::new(Self::COLUMNS, values);
        Ok(QualifiedCustomer {
            customer_id: f.int(0)?,
            customer_name: f.string(1)?,
            customer_city: f.string(2)?,
        })
    }
}

impl FromValues for CustomerSummary {
    const COLUMNS: &'static [&'static str] = &["total_qty", "total_value"];

    fn from_values(values: &[Value]) -> Result<Self> {
        let f = Fields::new(Self::COLUMNS, values);
        Ok(CustomerSummary {
            total_qty: f.decimal(0)?,
            total_value: f.decimal(1)?,
        })
    }
}

/// Decodes every row of a result.
pub fn decode_all<T: FromValues>(rows: Vec<Vec<Value>>) -> Result<Vec<T>> {
    rows.iter().map(|values| T::from_values(values)).collect()
}
