//! Row snapshots returned by read operations.

use serde::ser::{Serialize, SerializeMap, Serializer};
use tokio_postgres::Row;

use crate::error::{RowgateError, RowgateResult};
use crate::value::Value;

/// An owned, ordered column → [`Value`] snapshot of one database row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    columns: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode every column of a `tokio_postgres::Row`.
    pub fn from_row(row: &Row) -> RowgateResult<Self> {
        let mut columns = Vec::with_capacity(row.len());
        for (idx, column) in row.columns().iter().enumerate() {
            let value: Value = row
                .try_get(idx)
                .map_err(|e| RowgateError::decode(column.name(), e.to_string()))?;
            columns.push((column.name().to_string(), value));
        }
        Ok(Self { columns })
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    /// Set a column, replacing an existing value or appending a new column.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.columns.iter_mut().find(|(c, _)| *c == column) {
            Some((_, slot)) => *slot = value,
            None => self.columns.push((column, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(c, _)| c.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.columns.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(c, v)| (c.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (k, v) in iter {
            record.set(k, v);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, value) in &self.columns {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_in_column_order() {
        let record: Record = [
            ("id", Value::Int(1)),
            ("name", Value::from("Test Customer")),
            ("email", Value::Null),
        ]
        .into_iter()
        .collect();

        let text = serde_json::to_string(&record).unwrap();
        assert_eq!(text, r#"{"id":1,"name":"Test Customer","email":null}"#);
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"id": 1, "name": "Test Customer", "email": null})
        );
    }

    #[test]
    fn set_replaces_existing_column() {
        let mut record: Record = [("name", "a"), ("phone", "1")].into_iter().collect();
        record.set("name", "b");
        record.set("address", Value::Null);
        assert_eq!(record.len(), 3);
        assert_eq!(record.get("name"), Some(&Value::from("b")));
        assert_eq!(record.columns().collect::<Vec<_>>(), vec!["name", "phone", "address"]);
    }
}
