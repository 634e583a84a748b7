//! # rowgate
//!
//! A small data-access layer for single-table CRUD over PostgreSQL.
//!
//! ## Features
//!
//! - **Typed field maps**: [`FieldMap`] of column name to [`Value`] (text,
//!   integer, float, boolean, timestamp, null)
//! - **Bound parameters only**: values never reach SQL text; table and
//!   column names are validated as identifiers
//! - **Typed outcomes**: not-found is `Ok(None)`, zero rows affected is
//!   `Ok(0)`, failures are `Err`
//! - **One connection per [`Database`]**, with auto-commit, auto-reconnect
//!   and an optional statement timeout
//!
//! ```ignore
//! use rowgate::{ConnectionConfig, Database, FieldMap};
//!
//! let db = Database::connect(ConnectionConfig::from_env()?).await?;
//!
//! let id = db
//!     .insert("customers", FieldMap::new().with("name", "Test Customer"))
//!     .await?;
//! let row = db.get_one("customers", "id", id).await?;
//!
//! db.update("customers", "id", id, FieldMap::new().with("name", "Updated"))
//!     .await?;
//! db.delete("customers", "id", id).await?;
//! ```

pub mod client;
pub mod config;
pub mod crud;
pub mod database;
pub mod error;
pub mod ident;
pub mod literal;
pub mod qb;
pub mod record;
pub mod value;

pub use client::GenericClient;
pub use config::ConnectionConfig;
pub use crud::DEFAULT_KEY_COLUMN;
pub use database::Database;
pub use error::{RowgateError, RowgateResult};
pub use ident::Ident;
pub use qb::{DeleteQb, InsertQb, SelectQb, SqlQb, Statement, StatementKind, UpdateQb};
pub use record::Record;
pub use value::{FieldMap, Value};
