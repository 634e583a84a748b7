//! INSERT statement builder.

use crate::error::RowgateResult;
use crate::ident::Ident;
use crate::qb::statement::{SqlQb, Statement, StatementKind};
use crate::value::{FieldMap, Value};

/// INSERT builder.
#[derive(Clone, Debug)]
pub struct InsertQb {
    table: String,
    fields: FieldMap,
    returning: Vec<String>,
}

impl InsertQb {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            fields: FieldMap::new(),
            returning: Vec::new(),
        }
    }

    /// Set a column value.
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

    /// Add a RETURNING column.
    pub fn returning(mut self, column: &str) -> Self {
        self.returning.push(column.to_string());
        self
    }
}

impl SqlQb for InsertQb {
    fn build(&self) -> RowgateResult<Statement> {
        let table = Ident::parse(&self.table)?;
        let mut stmt = Statement::new(StatementKind::Insert, &table);
        stmt.push("INSERT INTO ").push_ident(&table);

        if self.fields.is_empty() {
            stmt.push(" DEFAULT VALUES");
        } else {
            stmt.push(" (");
            for (i, column) in self.fields.columns().enumerate() {
                if i > 0 {
                    stmt.push(", ");
                }
                stmt.push_name(column)?;
            }
            stmt.push(") VALUES (");
            for (i, (_, value)) in self.fields.iter().enumerate() {
                if i > 0 {
                    stmt.push(", ");
                }
                stmt.push_bind(value.clone());
            }
            stmt.push(")");
        }

        for (i, column) in self.returning.iter().enumerate() {
            stmt.push(if i == 0 { " RETURNING " } else { ", " });
            stmt.push_name(column)?;
        }

        Ok(stmt)
    }
}
