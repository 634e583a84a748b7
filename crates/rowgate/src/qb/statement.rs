//! Built statements: SQL text plus bound parameters.

use tokio_postgres::types::ToSql;

use crate::error::RowgateResult;
use crate::ident::Ident;
use crate::literal;
use crate::value::Value;

/// The kind of a statement, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Insert,
    Update,
    Delete,
    Select,
}

impl StatementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
            StatementKind::Select => "SELECT",
        }
    }
}

#[derive(Debug, Clone)]
enum SqlPart {
    Raw(String),
    Param,
}

/// A single SQL statement ready for execution.
///
/// SQL pieces and parameters are stored separately; `$1, $2, ...`
/// placeholders are numbered when the SQL is rendered.
#[derive(Debug, Clone)]
#[must_use]
pub struct Statement {
    kind: StatementKind,
    table: String,
    parts: Vec<SqlPart>,
    params: Vec<Value>,
}

impl Statement {
    pub(crate) fn new(kind: StatementKind, table: &Ident) -> Self {
        Self {
            kind,
            table: table.to_sql(),
            parts: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Append raw SQL (no parameters).
    pub(crate) fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }
        match self.parts.last_mut() {
            Some(SqlPart::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(SqlPart::Raw(sql.to_string())),
        }
        self
    }

    pub(crate) fn push_ident(&mut self, ident: &Ident) -> &mut Self {
        match self.parts.last_mut() {
            Some(SqlPart::Raw(last)) => ident.write_sql(last),
            _ => self.parts.push(SqlPart::Raw(ident.to_sql())),
        }
        self
    }

    /// Parse `name` as an identifier and append it.
    pub(crate) fn push_name(&mut self, name: &str) -> RowgateResult<&mut Self> {
        let ident = Ident::parse(name)?;
        Ok(self.push_ident(&ident))
    }

    /// Append a placeholder and bind its value.
    pub(crate) fn push_bind(&mut self, value: Value) -> &mut Self {
        self.parts.push(SqlPart::Param);
        self.params.push(value);
        self
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// The target table, as rendered in the SQL.
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Parameters as references for tokio-postgres.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p as &(dyn ToSql + Sync))
            .collect()
    }

    /// Render SQL with `$1, $2, ...` placeholders.
    pub fn sql(&self) -> String {
        self.render(|idx, _| format!("${idx}"))
    }

    /// Render SQL with every parameter inlined as an escaped literal.
    ///
    /// For logs only; execution always binds.
    pub fn inline_sql(&self) -> String {
        self.render(|_, value| literal::render_value(value))
    }

    fn render(&self, mut placeholder: impl FnMut(usize, &Value) -> String) -> String {
        let mut out = String::new();
        let mut params = self.params.iter();
        let mut idx = 0;
        for part in &self.parts {
            match part {
                SqlPart::Raw(s) => out.push_str(s),
                SqlPart::Param => {
                    idx += 1;
                    // parts and params are pushed together in push_bind
                    if let Some(value) = params.next() {
                        out.push_str(&placeholder(idx, value));
                    }
                }
            }
        }
        out
    }
}

/// Common interface of the statement builders.
pub trait SqlQb {
    /// Validate identifiers and builder state, then build the statement.
    fn build(&self) -> RowgateResult<Statement>;

    /// Debug helper to get the SQL string.
    fn to_sql(&self) -> RowgateResult<String> {
        self.build().map(|stmt| stmt.sql())
    }
}
