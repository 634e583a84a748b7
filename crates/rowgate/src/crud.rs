//! Single-statement CRUD operations keyed by one column.
//!
//! Each function builds one statement, runs it on the given client and maps
//! the outcome to a typed result:
//!
//! | operation     | success                | nothing matched | failure |
//! |---------------|------------------------|-----------------|---------|
//! | [`insert`]    | `Ok(id)`               | n/a             | `Err`   |
//! | [`update`]    | `Ok(n)`                | `Ok(0)`         | `Err`   |
//! | [`delete`]    | `Ok(n)`                | `Ok(0)`         | `Err`   |
//! | [`get_one`]   | `Ok(Some(record))`     | `Ok(None)`      | `Err`   |

use crate::client::GenericClient;
use crate::error::{RowgateError, RowgateResult};
use crate::qb::{self, SqlQb};
use crate::record::Record;
use crate::value::{FieldMap, Value};

/// Key column used by [`insert`] for the returned identifier.
pub const DEFAULT_KEY_COLUMN: &str = "id";

/// Insert one row and return its generated `id`.
///
/// An empty field map inserts `DEFAULT VALUES`.
pub async fn insert(
    conn: &impl GenericClient,
    table: &str,
    fields: FieldMap,
) -> RowgateResult<i64> {
    insert_returning(conn, table, DEFAULT_KEY_COLUMN, fields).await
}

/// Insert one row and return the generated value of `key_column`.
pub async fn insert_returning(
    conn: &impl GenericClient,
    table: &str,
    key_column: &str,
    fields: FieldMap,
) -> RowgateResult<i64> {
    let stmt = qb::insert(table)
        .set_fields(fields)
        .returning(key_column)
        .build()?;
    let record = conn
        .query_opt(&stmt)
        .await?
        .ok_or_else(|| RowgateError::decode(key_column, "INSERT returned no row"))?;

    match record.values().next() {
        Some(Value::Int(id)) => Ok(*id),
        Some(other) => Err(RowgateError::decode(
            key_column,
            format!("expected an integer identifier, got {}", other.kind()),
        )),
        None => Err(RowgateError::decode(key_column, "RETURNING produced no column")),
    }
}

/// Update the row(s) where `key_column = key_value` and return the number of
/// affected rows.
///
/// Only the columns in `fields` are written; a `Null` value sets the column
/// to NULL. An empty map is rejected before any SQL is sent.
pub async fn update(
    conn: &impl GenericClient,
    table: &str,
    key_column: &str,
    key_value: impl Into<Value>,
    fields: FieldMap,
) -> RowgateResult<u64> {
    let stmt = qb::update(table)
        .set_fields(fields)
        .eq(key_column, key_value)
        .build()?;
    conn.execute(&stmt).await
}

/// Delete the row(s) where `key_column = key_value` and return the number of
/// affected rows.
pub async fn delete(
    conn: &impl GenericClient,
    table: &str,
    key_column: &str,
    key_value: impl Into<Value>,
) -> RowgateResult<u64> {
    let stmt = qb::delete(table).eq(key_column, key_value).build()?;
    conn.execute(&stmt).await
}

/// Fetch the first row where `key_column = key_value`. At most one row is
/// requested from the server.
pub async fn get_one(
    conn: &impl GenericClient,
    table: &str,
    key_column: &str,
    key_value: impl Into<Value>,
) -> RowgateResult<Option<Record>> {
    let stmt = qb::select(table)
        .eq(key_column, key_value)
        .limit(1)
        .build()?;
    conn.query_opt(&stmt).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qb::Statement;
    use std::sync::Mutex;

    /// Records every statement and answers with canned results.
    #[derive(Default)]
    struct RecordingClient {
        sent: Mutex<Vec<(String, Vec<Value>)>>,
        rows: Vec<Record>,
        affected: u64,
    }

    impl RecordingClient {
        fn returning(rows: Vec<Record>) -> Self {
            Self {
                rows,
                ..Self::default()
            }
        }

        fn affecting(affected: u64) -> Self {
            Self {
                affected,
                ..Self::default()
            }
        }

        fn sent(&self) -> Vec<(String, Vec<Value>)> {
            self.sent.lock().unwrap().clone()
        }

        fn record(&self, stmt: &Statement) {
            self.sent
                .lock()
                .unwrap()
                .push((stmt.sql(), stmt.params().to_vec()));
        }
    }

    impl GenericClient for RecordingClient {
        async fn query(&self, stmt: &Statement) -> RowgateResult<Vec<Record>> {
            self.record(stmt);
            Ok(self.rows.clone())
        }

        async fn execute(&self, stmt: &Statement) -> RowgateResult<u64> {
            self.record(stmt);
            Ok(self.affected)
        }
    }

    fn customer() -> FieldMap {
        FieldMap::new()
            .with("name", "Test Customer")
            .with("phone", "01115789524")
            .with("email", "test@gmail.com")
            .with("address", "test address")
    }

    #[tokio::test]
    async fn insert_returns_generated_id() {
        let client = RecordingClient::returning(vec![[("id", 42i64)].into_iter().collect()]);
        let id = insert(&client, "customers", customer()).await.unwrap();
        assert_eq!(id, 42);

        let sent = client.sent();
        assert_eq!(
            sent[0].0,
            "INSERT INTO customers (name, phone, email, address) VALUES ($1, $2, $3, $4) RETURNING id"
        );
        assert_eq!(sent[0].1[2], Value::from("test@gmail.com"));
    }

    #[tokio::test]
    async fn insert_with_non_integer_key_is_a_decode_error() {
        let client = RecordingClient::returning(vec![[("code", "abc")].into_iter().collect()]);
        let err = insert_returning(&client, "customers", "code", customer())
            .await
            .unwrap_err();
        assert!(matches!(err, RowgateError::Decode { ref column, .. } if column == "code"));
    }

    #[tokio::test]
    async fn insert_without_returned_row_is_an_error() {
        let client = RecordingClient::default();
        assert!(insert(&client, "customers", customer()).await.is_err());
    }

    #[tokio::test]
    async fn update_reports_affected_rows() {
        let client = RecordingClient::affecting(1);
        let fields = FieldMap::new()
            .with("name", "Updated")
            .with("address", "Updated address");
        let n = update(&client, "customers", "id", 1i64, fields).await.unwrap();
        assert_eq!(n, 1);
        assert_eq!(
            client.sent()[0].0,
            "UPDATE customers SET name = $1, address = $2 WHERE id = $3"
        );
    }

    #[tokio::test]
    async fn update_of_missing_key_is_zero_not_error() {
        let client = RecordingClient::affecting(0);
        let fields = FieldMap::new().with("name", "x");
        assert_eq!(update(&client, "customers", "id", 999i64, fields).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn empty_update_sends_nothing() {
        let client = RecordingClient::affecting(1);
        let err = update(&client, "customers", "id", 1i64, FieldMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RowgateError::Validation(_)));
        assert!(client.sent().is_empty());
    }

    #[tokio::test]
    async fn bad_identifier_sends_nothing() {
        let client = RecordingClient::affecting(1);
        let err = delete(&client, "customers; --", "id", 1i64).await.unwrap_err();
        assert!(matches!(err, RowgateError::Validation(_)));
        assert!(client.sent().is_empty());
    }

    #[tokio::test]
    async fn delete_binds_key() {
        let client = RecordingClient::affecting(1);
        assert_eq!(delete(&client, "customers", "id", 1i64).await.unwrap(), 1);
        let sent = client.sent();
        assert_eq!(sent[0].0, "DELETE FROM customers WHERE id = $1");
        assert_eq!(sent[0].1, vec![Value::Int(1)]);
    }

    #[tokio::test]
    async fn get_one_returns_first_row_or_none() {
        let rows: Vec<Record> = vec![
            [("id", Value::Int(1)), ("email", Value::from("test@gmail.com"))]
                .into_iter()
                .collect(),
            [("id", Value::Int(2)), ("email", Value::from("other@gmail.com"))]
                .into_iter()
                .collect(),
        ];
        let client = RecordingClient::returning(rows);
        let record = get_one(&client, "customers", "id", 1i64).await.unwrap().unwrap();
        assert_eq!(record.get("email"), Some(&Value::from("test@gmail.com")));
        assert_eq!(
            client.sent()[0].0,
            "SELECT * FROM customers WHERE id = $1 LIMIT 1"
        );

        let empty = RecordingClient::default();
        assert!(get_one(&empty, "customers", "id", 1i64).await.unwrap().is_none());
    }
}
