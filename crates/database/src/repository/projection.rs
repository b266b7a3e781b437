//! Dynamic table projection over an allow-list of table names.

use super::Repository;
use crate::context::RequestContext;
use crate::error::{Error, Result};
use crate::schema::{customers, parts, shipments};
use serde::ser::{Serialize, SerializeMap, Serializer};
use shipdb_core::Value;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// A base table that may be projected by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TableName {
    Parts,
    Customers,
    Shipments,
}

impl TableName {
    /// Every projectable table.
    pub const ALL: [TableName; 3] = [TableName::Parts, TableName::Customers, TableName::Shipments];

    /// Returns the store name of the table.
    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::Parts => parts::TABLE,
            TableName::Customers => customers::TABLE,
            TableName::Shipments => shipments::TABLE,
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableName {
    type Err = Error;

    /// Exact, case-sensitive match against the allow-list.
    fn from_str(s: &str) -> Result<Self> {
        TableName::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::UnknownTable(s.to_string()))
    }
}

/// One row of a projected table: column names paired with their values, in
/// schema order.
#[derive(Clone, Debug, PartialEq)]
pub struct TableRow {
    columns: Vec<(String, Value)>,
}

impl TableRow {
    fn new(columns: Vec<(String, Value)>) -> Self {
        Self { columns }
    }

    /// Returns the column/value pairs.
    pub fn columns(&self) -> &[(String, Value)] {
        &self.columns
    }

    /// Returns the value of the named column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl Serialize for TableRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Repository {
    /// Returns every row of the named table in primary key order.
    ///
    /// `name` must be one of [`TableName::ALL`]; anything else is rejected
    /// before the store is touched.
    pub fn table_data(&self, ctx: &RequestContext, name: &str) -> Result<Vec<TableRow>> {
        let table = name.parse::<TableName>().map_err(|err| {
            warn!(table = name, "rejected projection of unknown table");
            err
        })?;
        ctx.check()?;

        let rows = self.db.read(|cache| {
            let store = cache
                .get_table(table.as_str())
                .ok_or_else(|| Error::UnknownTable(table.to_string()))?;
            let names: Vec<&str> = store.schema().columns().iter().map(|c| c.name()).collect();
            Ok(store
                .scan_by_pk()
                .into_iter()
                .map(|row| {
                    TableRow::new(
                        names
                            .iter()
                            .zip(row.values())
                            .map(|(name, value)| (name.to_string(), value.clone()))
                            .collect(),
                    )
                })
                .collect::<Vec<_>>())
        })?;

        debug!(%table, rows = rows.len(), "table projected");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_allow_list() {
        assert_eq!("parts".parse::<TableName>().unwrap(), TableName::Parts);
        assert_eq!("shipments".parse::<TableName>().unwrap(), TableName::Shipments);
        for rejected in ["invoices", "Parts", " parts", "", "parts; --"] {
            assert!(matches!(
                rejected.parse::<TableName>(),
                Err(Error::UnknownTable(name)) if name == rejected
            ));
        }
    }

    #[test]
    fn test_row_serializes_in_column_order() {
        let row = TableRow::new(vec![
            ("warehouse_no".into(), Value::Int64(5)),
            ("part_code".into(), Value::from("P1")),
            ("address".into(), Value::Null),
        ]);
        assert_eq!(row.len(), 3);
        assert_eq!(row.get("part_code"), Some(&Value::from("P1")));
        assert_eq!(row.get("missing"), None);
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"warehouse_no":5,"part_code":"P1","address":null}"#);
    }
}
