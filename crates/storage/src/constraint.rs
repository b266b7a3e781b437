//! Constraint checking for shipdb.
//!
//! This module provides constraint validation including column types,
//! not-null, check and foreign key constraints. Primary key and unique
//! constraints are enforced by the row store indices.

use crate::cache::TableCache;
use shipdb_core::schema::{Check, Table};
use shipdb_core::{Decimal, Error, Result, Row};

/// Constraint checker for validating store constraints.
pub struct ConstraintChecker;

impl ConstraintChecker {
    /// Checks every value against its column type.
    pub fn check_types(schema: &Table, row: &Row) -> Result<()> {
        if row.len() != schema.columns().len() {
            return Err(Error::invalid_operation(format!(
                "{} expects {} values, got {}",
                schema.name(),
                schema.columns().len(),
                row.len()
            )));
        }
        for (col, value) in schema.columns().iter().zip(row.values()) {
            match value.data_type() {
                Some(got) if got != col.data_type() => {
                    return Err(Error::type_mismatch(col.name(), col.data_type(), got));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Checks the not-null constraint for a row.
    pub fn check_not_null(schema: &Table, row: &Row) -> Result<()> {
        for col_name in schema.constraints().get_not_nullable() {
            let Some(col_idx) = schema.get_column_index(col_name) else {
                continue;
            };
            if row.get(col_idx).is_some_and(|v| v.is_null()) {
                return Err(Error::null_constraint(col_name.clone()));
            }
        }
        Ok(())
    }

    /// Checks the column check constraints for a row.
    pub fn check_checks(schema: &Table, row: &Row) -> Result<()> {
        for (col_name, check) in schema.constraints().get_checks() {
            let Some(value) = schema
                .get_column_index(col_name)
                .and_then(|idx| row.get(idx))
            else {
                continue;
            };
            match check {
                Check::NonNegative => {
                    if value.to_decimal().is_some_and(|d| d < Decimal::ZERO) {
                        return Err(Error::check_constraint(
                            col_name.clone(),
                            format!("{} must not be negative", value),
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Runs every row-local check: types, not-null and check constraints.
    pub fn check_row(schema: &Table, row: &Row) -> Result<()> {
        Self::check_types(schema, row)?;
        Self::check_not_null(schema, row)?;
        Self::check_checks(schema, row)
    }

    /// Checks foreign key constraints for insert.
    pub fn check_foreign_keys_for_insert(
        cache: &TableCache,
        schema: &Table,
        rows: &[Row],
    ) -> Result<()> {
        for fk in schema.constraints().get_foreign_keys() {
            let parent_store = cache
                .get_table(&fk.parent_table)
                .ok_or_else(|| Error::table_not_found(&fk.parent_table))?;
            let parent_col_idx = parent_store
                .schema()
                .get_column_index(&fk.parent_column)
                .ok_or_else(|| Error::column_not_found(&fk.parent_table, &fk.parent_column))?;
            let child_col_idx = schema
                .get_column_index(&fk.child_column)
                .ok_or_else(|| Error::column_not_found(schema.name(), &fk.child_column))?;

            for row in rows {
                if let Some(value) = row.get(child_col_idx) {
                    if !value.is_null() && !parent_store.contains_value(parent_col_idx, value) {
                        return Err(Error::ForeignKeyViolation {
                            constraint: fk.name.clone(),
                            message: format!(
                                "Key ({})=({}) is not present in table {}",
                                fk.child_column, value, fk.parent_table
                            ),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Checks that no child row still references any of the given parent rows.
    pub fn check_foreign_keys_for_delete(
        cache: &TableCache,
        schema: &Table,
        rows: &[Row],
    ) -> Result<()> {
        for table_name in cache.table_names() {
            let Some(child_store) = cache.get_table(table_name) else {
                continue;
            };
            let child_schema = child_store.schema();
            for fk in child_schema.constraints().get_foreign_keys() {
                if fk.parent_table != schema.name() {
                    continue;
                }
                let parent_col_idx = schema
                    .get_column_index(&fk.parent_column)
                    .ok_or_else(|| Error::column_not_found(schema.name(), &fk.parent_column))?;

                for row in rows {
                    let Some(value) = row.get(parent_col_idx) else {
                        continue;
                    };
                    // The foreign key index is named after its constraint.
                    let referencing = child_store.index_get(&fk.name, &[value.clone()]);
                    if !referencing.is_empty() {
                        return Err(Error::ForeignKeyViolation {
                            constraint: fk.name.clone(),
                            message: format!(
                                "Key ({})=({}) is still referenced by {} rows in table {}",
                                fk.parent_column,
                                value,
                                referencing.len(),
                                child_schema.name()
                            ),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Checks foreign key constraints for update, both as child and as parent.
    pub fn check_foreign_keys_for_update(
        cache: &TableCache,
        schema: &Table,
        modifications: &[(Row, Row)],
    ) -> Result<()> {
        let new_rows: Vec<Row> = modifications.iter().map(|(_, new)| new.clone()).collect();
        Self::check_foreign_keys_for_insert(cache, schema, &new_rows)?;

        let mut vacated = Vec::new();
        for (old_row, new_row) in modifications {
            for fk_parent_col in Self::referenced_columns(cache, schema) {
                if old_row.get(fk_parent_col) != new_row.get(fk_parent_col) {
                    vacated.push(old_row.clone());
                    break;
                }
            }
        }
        Self::check_foreign_keys_for_delete(cache, schema, &vacated)
    }

    /// Column positions of `schema` referenced by some foreign key.
    fn referenced_columns(cache: &TableCache, schema: &Table) -> Vec<usize> {
        cache
            .table_names()
            .into_iter()
            .filter_map(|name| cache.get_table(name))
            .flat_map(|store| store.schema().constraints().get_foreign_keys().to_vec())
            .filter(|fk| fk.parent_table == schema.name())
            .filter_map(|fk| schema.get_column_index(&fk.parent_column))
            .collect()
    }
}
