//! DELETE statement builder.

use crate::error::{RowgateError, RowgateResult};
use crate::ident::Ident;
use crate::qb::filter::EqFilter;
use crate::qb::statement::{SqlQb, Statement, StatementKind};
use crate::value::Value;

/// DELETE builder. A WHERE condition is mandatory.
#[derive(Clone, Debug)]
pub struct DeleteQb {
    table: String,
    filter: EqFilter,
}

impl DeleteQb {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            filter: EqFilter::default(),
        }
    }

    /// Add WHERE: column = value
    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filter.push(column, value.into());
        self
    }
}

impl SqlQb for DeleteQb {
    fn build(&self) -> RowgateResult<Statement> {
        if self.filter.is_empty() {
            return Err(RowgateError::validation(
                "DELETE requires a WHERE condition",
            ));
        }
        let table = Ident::parse(&self.table)?;
        let mut stmt = Statement::new(StatementKind::Delete, &table);
        stmt.push("DELETE FROM ").push_ident(&table);
        self.filter.write(&mut stmt)?;
        Ok(stmt)
    }
}
