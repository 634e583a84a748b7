//! Typed field values and field maps.
//!
//! A [`Value`] is one of the six kinds a column can be written with: text,
//! integer, float, boolean, timestamp or null. Values are always sent as
//! bound parameters. The wire encoding is chosen from the *target column
//! type* reported by the server, so an `Int` written to an `integer` column is
//! narrowed (with a range check) and a `Bool` written to an integer column is
//! sent as `0`/`1`.
//!
//! `numeric`, `uuid`, `json`/`jsonb` and enum columns have no kind of their
//! own: they are written from text (and numbers, for `numeric`) and read
//! back as text, except integral `numeric` values which read as `Int`.

use std::error::Error;
use std::fmt;

use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::ser::{Serialize, Serializer};
use tokio_postgres::types::{FromSql, IsNull, Kind, ToSql, Type, to_sql_checked};
use uuid::Uuid;

use crate::error::{RowgateError, RowgateResult};

/// Text form used when a timestamp is written to a text column.
pub const TIMESTAMP_TEXT_FORMAT: &str = "%Y%m%d%H%M%S";

type BoxError = Box<dyn Error + Sync + Send>;

/// A single column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Timestamp(NaiveDateTime),
    Null,
}

impl Value {
    /// Short name of the value kind, used in error messages and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Bool(_) => "boolean",
            Value::Timestamp(_) => "timestamp",
            Value::Null => "null",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Convert a loose JSON value for `column`.
    ///
    /// Dispatch order: string, then number or boolean, then null. Arrays and
    /// objects have no column representation and fail with
    /// [`RowgateError::DbType`].
    pub fn from_json(column: &str, value: &serde_json::Value) -> RowgateResult<Self> {
        use serde_json::Value as Json;

        match value {
            Json::String(s) => Ok(Value::Text(s.clone())),
            Json::Bool(b) => Ok(Value::Bool(*b)),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Value::Float(f))
                } else {
                    Err(RowgateError::db_type(column, "number out of range"))
                }
            }
            Json::Null => Ok(Value::Null),
            Json::Array(_) => Err(RowgateError::db_type(column, "array")),
            Json::Object(_) => Err(RowgateError::db_type(column, "object")),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Timestamp(ts) => write!(f, "{}", ts.format(TIMESTAMP_TEXT_FORMAT)),
            Value::Null => f.write_str("NULL"),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v.into())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v.naive_utc())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Text(s) => serializer.serialize_str(s),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Timestamp(ts) => ts.serialize(serializer),
            Value::Null => serializer.serialize_none(),
        }
    }
}

// ─── Wire encoding ──────────────────────────────────────────────────────────

/// Any column the driver writes from `&str`, including `citext`.
fn is_text_type(ty: &Type) -> bool {
    <&str as ToSql>::accepts(ty)
}

fn is_enum_type(ty: &Type) -> bool {
    matches!(ty.kind(), Kind::Enum(_))
}

fn numeric_value(d: Decimal) -> Value {
    if d.fract().is_zero() {
        if let Some(n) = d.to_i64() {
            return Value::Int(n);
        }
    }
    d.to_f64()
        .map_or_else(|| Value::Text(d.to_string()), Value::Float)
}

fn mismatch(value: &Value, ty: &Type) -> BoxError {
    format!("cannot store a {} value in a column of type {}", value.kind(), ty).into()
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Text(s) => match *ty {
                _ if is_text_type(ty) => s.as_str().to_sql(ty, out),
                // Enum labels travel as their text in binary format.
                _ if is_enum_type(ty) => {
                    out.extend_from_slice(s.as_bytes());
                    Ok(IsNull::No)
                }
                Type::NUMERIC => s.trim().parse::<Decimal>()?.to_sql(ty, out),
                Type::UUID => Uuid::parse_str(s.trim())?.to_sql(ty, out),
                Type::JSON | Type::JSONB => {
                    serde_json::from_str::<serde_json::Value>(s)?.to_sql(ty, out)
                }
                _ => Err(mismatch(self, ty)),
            },
            Value::Int(n) => match *ty {
                Type::INT2 => i16::try_from(*n)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*n)?.to_sql(ty, out),
                Type::INT8 => n.to_sql(ty, out),
                Type::FLOAT4 => (*n as f32).to_sql(ty, out),
                Type::FLOAT8 => (*n as f64).to_sql(ty, out),
                Type::NUMERIC => Decimal::from(*n).to_sql(ty, out),
                _ if is_text_type(ty) => n.to_string().to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
            Value::Float(x) => match *ty {
                Type::FLOAT4 => (*x as f32).to_sql(ty, out),
                Type::FLOAT8 => x.to_sql(ty, out),
                Type::NUMERIC => Decimal::try_from(*x)?.to_sql(ty, out),
                _ if is_text_type(ty) => x.to_string().to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
            Value::Bool(b) => match *ty {
                Type::BOOL => b.to_sql(ty, out),
                Type::INT2 => i16::from(*b).to_sql(ty, out),
                Type::INT4 => i32::from(*b).to_sql(ty, out),
                Type::INT8 => i64::from(*b).to_sql(ty, out),
                _ if is_text_type(ty) => (if *b { "1" } else { "0" }).to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
            Value::Timestamp(ts) => match *ty {
                Type::TIMESTAMP => ts.to_sql(ty, out),
                Type::TIMESTAMPTZ => ts.and_utc().to_sql(ty, out),
                Type::DATE => ts.date().to_sql(ty, out),
                _ if is_text_type(ty) => ts
                    .format(TIMESTAMP_TEXT_FORMAT)
                    .to_string()
                    .to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
        }
    }

    // Encoding is decided per value in `to_sql`.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

impl<'a> FromSql<'a> for Value {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        let value = match *ty {
            Type::BOOL => Value::Bool(bool::from_sql(ty, raw)?),
            Type::INT2 => Value::Int(i16::from_sql(ty, raw)?.into()),
            Type::INT4 => Value::Int(i32::from_sql(ty, raw)?.into()),
            Type::INT8 => Value::Int(i64::from_sql(ty, raw)?),
            Type::FLOAT4 => Value::Float(f32::from_sql(ty, raw)?.into()),
            Type::FLOAT8 => Value::Float(f64::from_sql(ty, raw)?),
            Type::TIMESTAMP => Value::Timestamp(NaiveDateTime::from_sql(ty, raw)?),
            Type::TIMESTAMPTZ => Value::Timestamp(DateTime::<Utc>::from_sql(ty, raw)?.naive_utc()),
            Type::DATE => Value::Timestamp(NaiveDate::from_sql(ty, raw)?.and_time(NaiveTime::MIN)),
            Type::NUMERIC => numeric_value(Decimal::from_sql(ty, raw)?),
            Type::UUID => Value::Text(Uuid::from_sql(ty, raw)?.to_string()),
            Type::JSON | Type::JSONB => {
                Value::Text(serde_json::Value::from_sql(ty, raw)?.to_string())
            }
            _ if <String as FromSql>::accepts(ty) => Value::Text(String::from_sql(ty, raw)?),
            _ if is_enum_type(ty) => Value::Text(std::str::from_utf8(raw)?.to_string()),
            _ => return Err(format!("unsupported column type: {ty}").into()),
        };
        Ok(value)
    }

    fn from_sql_null(_ty: &Type) -> Result<Self, BoxError> {
        Ok(Value::Null)
    }

    fn accepts(ty: &Type) -> bool {
        matches!(
            *ty,
            Type::BOOL
                | Type::INT2
                | Type::INT4
                | Type::INT8
                | Type::FLOAT4
                | Type::FLOAT8
                | Type::TIMESTAMP
                | Type::TIMESTAMPTZ
                | Type::DATE
                | Type::NUMERIC
                | Type::UUID
                | Type::JSON
                | Type::JSONB
        ) || <String as FromSql>::accepts(ty)
            || is_enum_type(ty)
    }
}

// ─── FieldMap ───────────────────────────────────────────────────────────────

/// Ordered mapping of column name to [`Value`] supplied for a write.
///
/// Insertion order is kept so the generated column list is stable. Setting a
/// column twice replaces the earlier value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    entries: Vec<(String, Value)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value (consuming version, for chaining).
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Set a column value, returning the previous value for that column.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((column, value));
                None
            }
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        let pos = self.entries.iter().position(|(c, _)| c == column)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// Build a field map from a JSON object, converting each member with
    /// [`Value::from_json`]. Fails on the first unsupported member.
    pub fn from_json_object(
        object: &serde_json::Map<String, serde_json::Value>,
    ) -> RowgateResult<Self> {
        let mut fields = Self::new();
        for (column, raw) in object {
            fields.insert(column.clone(), Value::from_json(column, raw)?);
        }
        Ok(fields)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}

impl IntoIterator for FieldMap {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encode(value: &Value, ty: &Type) -> Result<(IsNull, BytesMut), BoxError> {
        let mut buf = BytesMut::new();
        let is_null = value.to_sql_checked(ty, &mut buf)?;
        Ok((is_null, buf))
    }

    #[test]
    fn json_dispatch_keeps_booleans_out_of_text() {
        assert_eq!(Value::from_json("c", &json!(true)).unwrap(), Value::Bool(true));
        assert_eq!(Value::from_json("c", &json!("true")).unwrap(), Value::Text("true".into()));
        assert_eq!(Value::from_json("c", &json!(7)).unwrap(), Value::Int(7));
        assert_eq!(Value::from_json("c", &json!(1.5)).unwrap(), Value::Float(1.5));
        assert_eq!(Value::from_json("c", &json!(null)).unwrap(), Value::Null);
    }

    #[test]
    fn json_nested_values_are_type_errors() {
        let err = Value::from_json("address", &json!({"street": "x"})).unwrap_err();
        assert!(matches!(err, RowgateError::DbType { ref column, ref kind } if column == "address" && kind == "object"));

        let err = Value::from_json("tags", &json!([1, 2])).unwrap_err();
        assert!(err.is_db_type());
    }

    #[test]
    fn field_map_from_json_object_fails_fast() {
        let body = json!({"name": "Test Customer", "address": {"nested": true}});
        let err = FieldMap::from_json_object(body.as_object().unwrap()).unwrap_err();
        assert!(err.is_db_type());
    }

    #[test]
    fn field_map_replaces_in_place() {
        let mut fields = FieldMap::new().with("name", "a").with("phone", "1");
        assert_eq!(fields.insert("name", "b"), Some(Value::Text("a".into())));
        assert_eq!(fields.columns().collect::<Vec<_>>(), vec!["name", "phone"]);
        assert_eq!(fields.get("name"), Some(&Value::Text("b".into())));
        assert_eq!(fields.remove("phone"), Some(Value::Text("1".into())));
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn option_none_becomes_null() {
        let v: Value = Option::<&str>::None.into();
        assert!(v.is_null());
        let v: Value = Some(3i32).into();
        assert_eq!(v, Value::Int(3));
    }

    #[test]
    fn int_narrows_to_column_type() {
        let (_, buf) = encode(&Value::Int(42), &Type::INT4).unwrap();
        assert_eq!(&buf[..], &42i32.to_be_bytes());

        let (_, buf) = encode(&Value::Int(42), &Type::INT8).unwrap();
        assert_eq!(&buf[..], &42i64.to_be_bytes());

        assert!(encode(&Value::Int(i64::from(i32::MAX) + 1), &Type::INT4).is_err());
    }

    #[test]
    fn bool_into_integer_column_is_zero_or_one() {
        let (_, buf) = encode(&Value::Bool(true), &Type::INT4).unwrap();
        assert_eq!(&buf[..], &1i32.to_be_bytes());
        let (_, buf) = encode(&Value::Bool(false), &Type::INT2).unwrap();
        assert_eq!(&buf[..], &0i16.to_be_bytes());
        let (_, buf) = encode(&Value::Bool(true), &Type::BOOL).unwrap();
        assert_eq!(&buf[..], &[1u8]);
    }

    #[test]
    fn timestamp_into_text_column_uses_compact_format() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 7)
            .unwrap();
        let (_, buf) = encode(&Value::Timestamp(ts), &Type::TEXT).unwrap();
        assert_eq!(&buf[..], b"20240309140507");
    }

    #[test]
    fn null_encodes_for_any_column() {
        let (is_null, buf) = encode(&Value::Null, &Type::INT4).unwrap();
        assert!(matches!(is_null, IsNull::Yes));
        assert!(buf.is_empty());
    }

    #[test]
    fn text_into_integer_column_is_rejected() {
        assert!(encode(&Value::Text("1".into()), &Type::INT4).is_err());
    }

    fn citext() -> Type {
        Type::new("citext".into(), 91_000, Kind::Simple, "public".into())
    }

    #[test]
    fn text_writes_to_any_driver_text_column() {
        let (_, buf) = encode(&Value::from("a@b.c"), &citext()).unwrap();
        assert_eq!(&buf[..], b"a@b.c");
        assert!(<Value as FromSql>::accepts(&citext()));

        let (_, buf) = encode(&Value::Int(7), &citext()).unwrap();
        assert_eq!(&buf[..], b"7");
    }

    #[test]
    fn numbers_round_trip_through_numeric() {
        let (_, buf) = encode(&Value::Int(5), &Type::NUMERIC).unwrap();
        assert_eq!(Value::from_sql(&Type::NUMERIC, &buf).unwrap(), Value::Int(5));

        let (_, buf) = encode(&Value::Float(10.5), &Type::NUMERIC).unwrap();
        assert_eq!(Value::from_sql(&Type::NUMERIC, &buf).unwrap(), Value::Float(10.5));

        let (_, buf) = encode(&Value::from("12.25"), &Type::NUMERIC).unwrap();
        assert_eq!(Value::from_sql(&Type::NUMERIC, &buf).unwrap(), Value::Float(12.25));

        assert!(encode(&Value::from("twelve"), &Type::NUMERIC).is_err());
    }

    #[test]
    fn uuid_columns_read_and_write_as_text() {
        let id = "67e55044-10b1-426f-9247-bb680e5fe0c8";
        let (_, buf) = encode(&Value::from(id), &Type::UUID).unwrap();
        assert_eq!(buf.len(), 16);
        assert_eq!(Value::from_sql(&Type::UUID, &buf).unwrap(), Value::from(id));

        assert!(encode(&Value::from("not-a-uuid"), &Type::UUID).is_err());
    }

    #[test]
    fn json_columns_read_and_write_as_text() {
        for ty in [Type::JSON, Type::JSONB] {
            let (_, buf) = encode(&Value::from(r#"{"a": 1}"#), &ty).unwrap();
            assert_eq!(Value::from_sql(&ty, &buf).unwrap(), Value::from(r#"{"a":1}"#));
        }
        assert!(encode(&Value::from("{broken"), &Type::JSONB).is_err());
    }

    #[test]
    fn enum_labels_read_and_write_as_text() {
        let mood = Type::new(
            "mood".into(),
            91_001,
            Kind::Enum(vec!["happy".into(), "sad".into()]),
            "public".into(),
        );
        let (_, buf) = encode(&Value::from("happy"), &mood).unwrap();
        assert_eq!(&buf[..], b"happy");
        assert!(<Value as FromSql>::accepts(&mood));
        assert_eq!(Value::from_sql(&mood, b"sad").unwrap(), Value::from("sad"));
    }

    #[test]
    fn decode_reads_typed_columns() {
        let v = Value::from_sql(&Type::INT4, &7i32.to_be_bytes()).unwrap();
        assert_eq!(v, Value::Int(7));
        let v = Value::from_sql(&Type::TEXT, b"hello").unwrap();
        assert_eq!(v, Value::Text("hello".into()));
        let v = Value::from_sql_nullable(&Type::TEXT, None).unwrap();
        assert_eq!(v, Value::Null);
    }

    #[test]
    fn serializes_as_plain_json() {
        let fields = [
            Value::Text("x".into()),
            Value::Int(1),
            Value::Bool(false),
            Value::Null,
        ];
        assert_eq!(serde_json::to_value(&fields).unwrap(), json!(["x", 1, false, null]));
    }
}
