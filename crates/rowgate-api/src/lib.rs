//! # rowgate-api
//!
//! REST facade over the `customers` table.
//!
//! Routes (all JSON, prefix `/api`):
//!
//! | method   | path                  | result                          |
//! |----------|-----------------------|---------------------------------|
//! | `GET`    | `/`                   | welcome text                    |
//! | `POST`   | `/api/customers`      | created customer                |
//! | `GET`    | `/api/customers/:id`  | customer, or 404                |
//! | `PUT`    | `/api/customers/:id`  | updated customer, or 404        |
//! | `DELETE` | `/api/customers/:id`  | confirmation, or 404            |

pub mod config;
pub mod error;
pub mod response;
pub mod routes;
pub mod store;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use response::Envelope;
pub use routes::router;
pub use store::{CustomerStore, MemoryCustomerStore, PgCustomerStore};
