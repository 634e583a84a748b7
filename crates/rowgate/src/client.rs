//! Generic client trait for executing built statements.

use crate::error::RowgateResult;
use crate::qb::Statement;
use crate::record::Record;

/// A trait over anything that can run a [`Statement`].
///
/// Implemented for `tokio_postgres::Client` (raw driver access) and for
/// [`Database`](crate::Database), which adds timeouts, logging and the
/// implicit transaction. The CRUD operations in [`crate::crud`] accept any
/// implementor.
pub trait GenericClient: Send + Sync {
    /// Execute a statement and return all rows.
    fn query(
        &self,
        stmt: &Statement,
    ) -> impl std::future::Future<Output = RowgateResult<Vec<Record>>> + Send;

    /// Execute a statement and return the first row, if any.
    ///
    /// Semantics:
    /// - 0 rows: returns `Ok(None)`
    /// - 1 or more rows: returns `Ok(Some(first_row))`
    fn query_opt(
        &self,
        stmt: &Statement,
    ) -> impl std::future::Future<Output = RowgateResult<Option<Record>>> + Send {
        async move {
            let rows = self.query(stmt).await?;
            Ok(rows.into_iter().next())
        }
    }

    /// Execute a statement and return the number of affected rows.
    fn execute(
        &self,
        stmt: &Statement,
    ) -> impl std::future::Future<Output = RowgateResult<u64>> + Send;
}

impl GenericClient for tokio_postgres::Client {
    async fn query(&self, stmt: &Statement) -> RowgateResult<Vec<Record>> {
        let sql = stmt.sql();
        let params = stmt.params_ref();
        let rows = tokio_postgres::Client::query(self, sql.as_str(), &params).await?;
        rows.iter().map(Record::from_row).collect()
    }

    async fn execute(&self, stmt: &Statement) -> RowgateResult<u64> {
        let sql = stmt.sql();
        let params = stmt.params_ref();
        Ok(tokio_postgres::Client::execute(self, sql.as_str(), &params).await?)
    }
}
