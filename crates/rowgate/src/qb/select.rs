//! SELECT statement builder.

use crate::error::RowgateResult;
use crate::ident::Ident;
use crate::qb::filter::EqFilter;
use crate::qb::statement::{SqlQb, Statement, StatementKind};
use crate::value::Value;

/// SELECT builder over a single table.
#[derive(Clone, Debug)]
pub struct SelectQb {
    table: String,
    filter: EqFilter,
    limit: Option<u64>,
}

impl SelectQb {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            filter: EqFilter::default(),
            limit: None,
        }
    }

    /// Add WHERE: column = value
    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filter.push(column, value.into());
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl SqlQb for SelectQb {
    fn build(&self) -> RowgateResult<Statement> {
        let table = Ident::parse(&self.table)?;
        let mut stmt = Statement::new(StatementKind::Select, &table);
        stmt.push("SELECT * FROM ").push_ident(&table);
        self.filter.write(&mut stmt)?;
        if let Some(limit) = self.limit {
            stmt.push(&format!(" LIMIT {limit}"));
        }
        Ok(stmt)
    }
}
