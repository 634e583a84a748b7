//! Equality WHERE clauses shared by UPDATE, DELETE and SELECT.

use crate::error::RowgateResult;
use crate::qb::statement::Statement;
use crate::value::Value;

/// A conjunction of `column = value` conditions.
///
/// A `Null` value renders as `column IS NULL`, since `= NULL` never matches.
#[derive(Debug, Clone, Default)]
pub(crate) struct EqFilter {
    conditions: Vec<(String, Value)>,
}

impl EqFilter {
    pub(crate) fn push(&mut self, column: &str, value: Value) {
        self.conditions.push((column.to_string(), value));
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Append ` WHERE ...` (nothing if there are no conditions).
    pub(crate) fn write(&self, stmt: &mut Statement) -> RowgateResult<()> {
        for (i, (column, value)) in self.conditions.iter().enumerate() {
            stmt.push(if i == 0 { " WHERE " } else { " AND " });
            stmt.push_name(column)?;
            if value.is_null() {
                stmt.push(" IS NULL");
            } else {
                stmt.push(" = ").push_bind(value.clone());
            }
        }
        Ok(())
    }
}
