//! Connection manager: one live PostgreSQL connection per instance.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls};

use crate::client::GenericClient;
use crate::config::ConnectionConfig;
use crate::crud;
use crate::error::{RowgateError, RowgateResult};
use crate::qb::Statement;
use crate::record::Record;
use crate::value::{FieldMap, Value};

struct Live {
    client: Client,
    driver: JoinHandle<()>,
}

impl Live {
    async fn open(config: &ConnectionConfig) -> RowgateResult<Self> {
        let (client, connection) = config
            .to_pg_config()
            .connect(NoTls)
            .await
            .map_err(|e| RowgateError::connection("failed to connect to the database", e))?;

        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(target: "rowgate.conn", error = %e, "connection closed with error");
            }
        });

        if let Err(e) = client.simple_query("SELECT 1").await {
            driver.abort();
            return Err(RowgateError::connection("ping after connect failed", e));
        }

        tracing::info!(
            target: "rowgate.conn",
            host = %config.host,
            port = config.port,
            dbname = %config.dbname,
            "connected"
        );
        Ok(Self { client, driver })
    }
}

/// A single database connection plus the CRUD operations that run on it.
///
/// Build it once and pass it by reference. Statements issued through
/// `&self` share one connection; callers that need one in-flight statement
/// at a time (for example with auto-commit off) must serialize access
/// themselves.
pub struct Database {
    config: ConnectionConfig,
    live: Option<Live>,
    in_transaction: AtomicBool,
}

impl Database {
    /// Validate `config` and open the connection.
    ///
    /// Configuration errors are reported before any I/O. A failed connect
    /// returns [`RowgateError::Connection`] with the driver error as source.
    /// No retry is attempted.
    pub async fn connect(config: ConnectionConfig) -> RowgateResult<Self> {
        config.validate()?;
        let live = Live::open(&config).await?;
        Ok(Self {
            config,
            live: Some(live),
            in_transaction: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// True after `close()` or once the server side has gone away.
    pub fn is_closed(&self) -> bool {
        self.live.as_ref().is_none_or(|live| live.client.is_closed())
    }

    /// Whether an implicit transaction is open (auto-commit off only).
    pub fn in_transaction(&self) -> bool {
        self.in_transaction.load(Ordering::Acquire)
    }

    /// Make sure the connection is usable.
    ///
    /// A connection dropped by the server is re-opened once when
    /// `auto_reconnect` is on. An explicitly closed instance stays closed.
    pub async fn ensure_connected(&mut self) -> RowgateResult<()> {
        match &self.live {
            None => return Err(RowgateError::Closed),
            Some(live) if !live.client.is_closed() => return Ok(()),
            Some(_) => {}
        }
        if !self.config.auto_reconnect {
            return Err(RowgateError::connection_lost(
                "connection lost and auto_reconnect is disabled",
            ));
        }

        tracing::warn!(target: "rowgate.conn", "connection lost, reconnecting");
        if self.in_transaction.swap(false, Ordering::AcqRel) {
            tracing::warn!(target: "rowgate.conn", "uncommitted transaction discarded");
        }
        let live = Live::open(&self.config).await?;
        if let Some(old) = self.live.replace(live) {
            old.driver.abort();
        }
        Ok(())
    }

    /// Release the connection. Calling it again is a no-op.
    pub async fn close(&mut self) {
        let Some(live) = self.live.take() else {
            return;
        };
        self.in_transaction.store(false, Ordering::Release);
        drop(live.client);
        // The driver future resolves once the client is gone.
        let _ = live.driver.await;
        tracing::info!(target: "rowgate.conn", "connection closed");
    }

    /// Commit the implicit transaction, if one is open.
    pub async fn commit(&self) -> RowgateResult<()> {
        self.finish_transaction("COMMIT").await
    }

    /// Roll back the implicit transaction, if one is open.
    pub async fn rollback(&self) -> RowgateResult<()> {
        self.finish_transaction("ROLLBACK").await
    }

    pub async fn insert(&self, table: &str, fields: FieldMap) -> RowgateResult<i64> {
        crud::insert(self, table, fields).await
    }

    pub async fn insert_returning(
        &self,
        table: &str,
        key_column: &str,
        fields: FieldMap,
    ) -> RowgateResult<i64> {
        crud::insert_returning(self, table, key_column, fields).await
    }

    pub async fn update(
        &self,
        table: &str,
        key_column: &str,
        key_value: impl Into<Value>,
        fields: FieldMap,
    ) -> RowgateResult<u64> {
        crud::update(self, table, key_column, key_value, fields).await
    }

    pub async fn delete(
        &self,
        table: &str,
        key_column: &str,
        key_value: impl Into<Value>,
    ) -> RowgateResult<u64> {
        crud::delete(self, table, key_column, key_value).await
    }

    pub async fn get_one(
        &self,
        table: &str,
        key_column: &str,
        key_value: impl Into<Value>,
    ) -> RowgateResult<Option<Record>> {
        crud::get_one(self, table, key_column, key_value).await
    }

    fn client(&self) -> RowgateResult<&Client> {
        self.live
            .as_ref()
            .map(|live| &live.client)
            .ok_or(RowgateError::Closed)
    }

    async fn finish_transaction(&self, command: &str) -> RowgateResult<()> {
        let client = self.client()?;
        if !self.in_transaction.swap(false, Ordering::AcqRel) {
            return Ok(());
        }
        tracing::debug!(target: "rowgate.sql", command, "ending transaction");
        client.batch_execute(command).await?;
        Ok(())
    }

    /// Open the implicit transaction before the first statement when
    /// auto-commit is off.
    async fn begin_implicit(&self, client: &Client) -> RowgateResult<()> {
        if self.config.auto_commit {
            return Ok(());
        }
        if self
            .in_transaction
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(());
        }
        if let Err(e) = client.batch_execute("BEGIN").await {
            self.in_transaction.store(false, Ordering::Release);
            return Err(e.into());
        }
        Ok(())
    }

    /// Execute with the statement timeout if configured.
    async fn with_timeout<T, F>(&self, client: &Client, future: F) -> RowgateResult<T>
    where
        F: std::future::Future<Output = RowgateResult<T>> + Send,
    {
        match self.config.statement_timeout {
            Some(timeout) => tokio::time::timeout(timeout, future).await.map_err(|_| {
                let cancel_token = client.cancel_token();
                tokio::spawn(async move {
                    let _ = cancel_token.cancel_query(NoTls).await;
                });
                RowgateError::Timeout(timeout)
            })?,
            None => future.await,
        }
    }

    /// Get the client for one statement: opens the implicit transaction if
    /// needed and logs the SQL.
    async fn prepare(&self, stmt: &Statement) -> RowgateResult<&Client> {
        let client = self.client()?;
        self.begin_implicit(client).await?;

        tracing::debug!(
            target: "rowgate.sql",
            kind = stmt.kind().as_str(),
            table = stmt.table(),
            sql = %stmt.sql(),
            "executing statement"
        );
        tracing::trace!(target: "rowgate.sql", inline = %stmt.inline_sql());
        Ok(client)
    }
}

fn log_failure<T>(stmt: &Statement, result: RowgateResult<T>) -> RowgateResult<T> {
    if let Err(e) = &result {
        tracing::warn!(
            target: "rowgate.sql",
            kind = stmt.kind().as_str(),
            table = stmt.table(),
            error = %e,
            "statement failed"
        );
    }
    result
}

impl GenericClient for Database {
    async fn query(&self, stmt: &Statement) -> RowgateResult<Vec<Record>> {
        let client = self.prepare(stmt).await?;
        let result = self
            .with_timeout(client, GenericClient::query(client, stmt))
            .await;
        log_failure(stmt, result)
    }

    async fn execute(&self, stmt: &Statement) -> RowgateResult<u64> {
        let client = self.prepare(stmt).await?;
        let result = self
            .with_timeout(client, GenericClient::execute(client, stmt))
            .await;
        log_failure(stmt, result)
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        if let Some(live) = self.live.take() {
            drop(live.client);
            live.driver.abort();
        }
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("config", &self.config)
            .field("closed", &self.is_closed())
            .field("in_transaction", &self.in_transaction())
            .finish()
    }
}
