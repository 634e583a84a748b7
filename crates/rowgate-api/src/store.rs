//! Customer persistence behind the HTTP routes.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Mutex as StdMutex;

use rowgate::{Database, FieldMap, Record, RowgateError, RowgateResult, Value};
use tokio::sync::Mutex;

pub const CUSTOMER_TABLE: &str = "customers";
pub const CUSTOMER_KEY: &str = "id";
/// Writable columns. Anything else in a request body is rejected.
pub const CUSTOMER_COLUMNS: [&str; 4] = ["name", "phone", "email", "address"];

/// CRUD over the customers table, keyed by `id`.
pub trait CustomerStore: Send + Sync + 'static {
    /// Insert a customer and return the stored row.
    fn create(&self, fields: FieldMap) -> impl Future<Output = RowgateResult<Record>> + Send;

    fn find(&self, id: i64) -> impl Future<Output = RowgateResult<Option<Record>>> + Send;

    /// Apply a partial update and return the row as stored afterwards, or
    /// `None` if there is no such customer. The write and the read happen as
    /// one unit. An empty map writes nothing and returns the current row.
    fn update(
        &self,
        id: i64,
        fields: FieldMap,
    ) -> impl Future<Output = RowgateResult<Option<Record>>> + Send;

    fn remove(&self, id: i64) -> impl Future<Output = RowgateResult<u64>> + Send;
}

/// PostgreSQL-backed store sharing one [`Database`].
///
/// Requests are serialized on the connection. When auto-commit is off each
/// request commits its own work before returning.
pub struct PgCustomerStore {
    db: Mutex<Database>,
}

impl PgCustomerStore {
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    /// Close the underlying connection.
    pub async fn close(&self) {
        self.db.lock().await.close().await;
    }
}

/// Commit on success, roll back on failure. Both are no-ops under
/// auto-commit.
async fn settle<T>(db: &Database, result: RowgateResult<T>) -> RowgateResult<T> {
    match result {
        Ok(value) => {
            db.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = db.rollback().await {
                tracing::warn!(target: "rowgate_api", error = %rollback, "rollback failed");
            }
            Err(e)
        }
    }
}

impl CustomerStore for PgCustomerStore {
    async fn create(&self, fields: FieldMap) -> RowgateResult<Record> {
        let mut db = self.db.lock().await;
        db.ensure_connected().await?;
        let result = async {
            let id = db.insert_returning(CUSTOMER_TABLE, CUSTOMER_KEY, fields).await?;
            db.get_one(CUSTOMER_TABLE, CUSTOMER_KEY, id)
                .await?
                .ok_or_else(|| {
                    RowgateError::decode(CUSTOMER_KEY, format!("row {id} missing after insert"))
                })
        }
        .await;
        settle(&db, result).await
    }

    async fn find(&self, id: i64) -> RowgateResult<Option<Record>> {
        let mut db = self.db.lock().await;
        db.ensure_connected().await?;
        let result = db.get_one(CUSTOMER_TABLE, CUSTOMER_KEY, id).await;
        settle(&db, result).await
    }

    async fn update(&self, id: i64, fields: FieldMap) -> RowgateResult<Option<Record>> {
        let mut db = self.db.lock().await;
        db.ensure_connected().await?;
        let result = async {
            if !fields.is_empty() {
                let changed = db.update(CUSTOMER_TABLE, CUSTOMER_KEY, id, fields).await?;
                if changed == 0 {
                    return Ok(None);
                }
            }
            db.get_one(CUSTOMER_TABLE, CUSTOMER_KEY, id).await
        }
        .await;
        settle(&db, result).await
    }

    async fn remove(&self, id: i64) -> RowgateResult<u64> {
        let mut db = self.db.lock().await;
        db.ensure_connected().await?;
        let result = db.delete(CUSTOMER_TABLE, CUSTOMER_KEY, id).await;
        settle(&db, result).await
    }
}

/// In-process store with the same row shape as the customers table.
#[derive(Debug, Default)]
pub struct MemoryCustomerStore {
    inner: StdMutex<MemoryRows>,
}

#[derive(Debug, Default)]
struct MemoryRows {
    next_id: i64,
    rows: BTreeMap<i64, Record>,
}

impl MemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryRows> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn check_columns(fields: &FieldMap) -> RowgateResult<()> {
    match fields.columns().find(|c| !CUSTOMER_COLUMNS.contains(c)) {
        Some(column) => Err(RowgateError::validation(format!(
            "column {column:?} does not exist in {CUSTOMER_TABLE}"
        ))),
        None => Ok(()),
    }
}

impl CustomerStore for MemoryCustomerStore {
    async fn create(&self, fields: FieldMap) -> RowgateResult<Record> {
        check_columns(&fields)?;
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id;

        let mut record = Record::new();
        record.set(CUSTOMER_KEY, id);
        for column in CUSTOMER_COLUMNS {
            record.set(column, fields.get(column).cloned().unwrap_or(Value::Null));
        }
        inner.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn find(&self, id: i64) -> RowgateResult<Option<Record>> {
        Ok(self.lock().rows.get(&id).cloned())
    }

    async fn update(&self, id: i64, fields: FieldMap) -> RowgateResult<Option<Record>> {
        check_columns(&fields)?;
        let mut inner = self.lock();
        let Some(record) = inner.rows.get_mut(&id) else {
            return Ok(None);
        };
        for (column, value) in fields {
            record.set(column, value);
        }
        Ok(Some(record.clone()))
    }

    async fn remove(&self, id: i64) -> RowgateResult<u64> {
        Ok(u64::from(self.lock().rows.remove(&id).is_some()))
    }
}
