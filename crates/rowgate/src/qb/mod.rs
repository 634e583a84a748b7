//! Statement builders.
//!
//! Every builder validates table and column names as identifiers and binds
//! all values as parameters.
//!
//! ```ignore
//! use rowgate::qb::{self, SqlQb};
//!
//! let stmt = qb::update("customers")
//!     .set("name", "Updated")
//!     .eq("id", 1i64)
//!     .build()?;
//! assert_eq!(stmt.sql(), "UPDATE customers SET name = $1 WHERE id = $2");
//! ```

mod delete;
mod filter;
mod insert;
mod select;
mod statement;
mod update;

pub use delete::DeleteQb;
pub use insert::InsertQb;
pub use select::SelectQb;
pub use statement::{SqlQb, Statement, StatementKind};
pub use update::UpdateQb;

/// Create an INSERT builder for the given table.
pub fn insert(table: &str) -> InsertQb {
    InsertQb::new(table)
}

/// Create an UPDATE builder for the given table.
pub fn update(table: &str) -> UpdateQb {
    UpdateQb::new(table)
}

/// Create a DELETE builder for the given table.
pub fn delete(table: &str) -> DeleteQb {
    DeleteQb::new(table)
}

/// Create a SELECT builder for the given table.
pub fn select(table: &str) -> SelectQb {
    SelectQb::new(table)
}
