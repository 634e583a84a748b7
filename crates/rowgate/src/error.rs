//! Error types for rowgate

use std::time::Duration;
use thiserror::Error;

/// Result type alias for rowgate operations
pub type RowgateResult<T> = Result<T, RowgateError>;

/// Error types for configuration, connection and statement execution
#[derive(Debug, Error)]
pub enum RowgateError {
    /// Invalid connection configuration, raised before any I/O
    #[error("Invalid configuration for '{field}': {message}")]
    ConfigType {
        field: &'static str,
        message: String,
    },

    /// Failure to establish (or re-establish) the connection
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<tokio_postgres::Error>,
    },

    /// A field value whose kind cannot be stored
    #[error("Unsupported value for column '{column}': {kind} is not a supported field type")]
    DbType { column: String, kind: String },

    /// Statement execution error reported by the server or driver
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Builder or identifier validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Statement timeout
    #[error("Query timeout after {0:?}")]
    Timeout(Duration),

    /// Operation attempted after `close()`
    #[error("Connection is closed")]
    Closed,
}

impl RowgateError {
    /// Create a configuration error for a specific field
    pub fn config_type(field: &'static str, message: impl Into<String>) -> Self {
        Self::ConfigType {
            field,
            message: message.into(),
        }
    }

    /// Create a connection error wrapping a driver error
    pub fn connection(message: impl Into<String>, source: tokio_postgres::Error) -> Self {
        Self::Connection {
            message: format!("{}: {}", message.into(), source),
            source: Some(source),
        }
    }

    /// Create a connection error with no underlying driver error
    pub fn connection_lost(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Create an unsupported-type error for a column
    pub fn db_type(column: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::DbType {
            column: column.into(),
            kind: kind.into(),
        }
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// The offending configuration field, if this is a configuration error
    pub fn config_field(&self) -> Option<&'static str> {
        match self {
            Self::ConfigType { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Check if this is an unsupported field type error
    pub fn is_db_type(&self) -> bool {
        matches!(self, Self::DbType { .. })
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Whether the error happened while a statement was running on the server.
    pub fn is_execution(&self) -> bool {
        matches!(self, Self::Query(_) | Self::Timeout(_))
    }
}
