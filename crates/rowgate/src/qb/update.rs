//! UPDATE statement builder.

use crate::error::{RowgateError, RowgateResult};
use crate::ident::Ident;
use crate::qb::filter::EqFilter;
use crate::qb::statement::{SqlQb, Statement, StatementKind};
use crate::value::{FieldMap, Value};

/// UPDATE builder.
///
/// Requires at least one SET column and at least one WHERE condition.
#[derive(Clone, Debug)]
pub struct UpdateQb {
    table: String,
    fields: FieldMap,
    filter: EqFilter,
}

impl UpdateQb {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            fields: FieldMap::new(),
            filter: EqFilter::default(),
        }
    }

    /// Set a column value. `Value::Null` renders as `column = $n` bound to NULL.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(column, value);
        self
    }

    /// Set every column of a field map, in its order.
    pub fn set_fields(mut self, fields: FieldMap) -> Self {
        for (column, value) in fields {
            self.fields.insert(column, value);
        }
        self
    }

    /// Add WHERE: column = value
    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filter.push(column, value.into());
        self
    }
}

impl SqlQb for UpdateQb {
    fn build(&self) -> RowgateResult<Statement> {
        if self.fields.is_empty() {
            return Err(RowgateError::validation(
                "UPDATE requires at least one SET column",
            ));
        }
        if self.filter.is_empty() {
            return Err(RowgateError::validation(
                "UPDATE requires a WHERE condition",
            ));
        }

        let table = Ident::parse(&self.table)?;
        let mut stmt = Statement::new(StatementKind::Update, &table);
        stmt.push("UPDATE ").push_ident(&table).push(" SET ");
        for (i, (column, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                stmt.push(", ");
            }
            stmt.push_name(column)?.push(" = ").push_bind(value.clone());
        }
        self.filter.write(&mut stmt)?;
        Ok(stmt)
    }
}
