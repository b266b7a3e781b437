//! Sort executor.

use crate::ast::SortOrder;
use crate::executor::{Relation, RelationEntry};
use std::cmp::Ordering;

/// Sort executor - sorts rows by specified columns.
///
/// The sort is stable, so rows that tie on every key keep their input order.
pub struct SortExecutor {
    /// Column indices and sort orders.
    order_by: Vec<(usize, SortOrder)>,
}

impl SortExecutor {
    /// Creates a new sort executor.
    pub fn new(order_by: Vec<(usize, SortOrder)>) -> Self {
        Self { order_by }
    }

    /// Executes the sort on the input relation.
    pub fn execute(&self, mut input: Relation) -> Relation {
        input.entries.sort_by(|a, b| self.compare_entries(a, b));
        input
    }

    fn compare_entries(&self, a: &RelationEntry, b: &RelationEntry) -> Ordering {
        for (col_idx, order) in &self.order_by {
            let a_val = a.get_field(*col_idx);
            let b_val = b.get_field(*col_idx);

            let cmp = match (a_val, b_val) {
                (Some(av), Some(bv)) => av.cmp(bv),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };

            if cmp != Ordering::Equal {
                return match order {
                    SortOrder::Asc => cmp,
                    SortOrder::Desc => cmp.reverse(),
                };
            }
        }
        Ordering::Equal
    }
}
