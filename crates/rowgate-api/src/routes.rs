//! Axum router for the customer endpoints.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::routing::{get, post};
use rowgate::{FieldMap, Record};
use tower_http::trace::TraceLayer;

use crate::error::{ApiError, ApiResult};
use crate::response::Envelope;
use crate::store::{CUSTOMER_COLUMNS, CustomerStore};

pub const WELCOME: &str = "Welcome to rowgate!";

/// Build the application router around a customer store.
pub fn router<S: CustomerStore>(store: Arc<S>) -> Router {
    let customers: Router<Arc<S>> = Router::new()
        .route("/customers", post(create_customer::<S>))
        .route(
            "/customers/:id",
            get(get_customer::<S>)
                .put(update_customer::<S>)
                .delete(delete_customer::<S>),
        );

    Router::new()
        .route("/", get(index))
        .nest("/api", customers)
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

async fn index() -> &'static str {
    WELCOME
}

fn customer_id(path: Result<Path<i64>, PathRejection>) -> ApiResult<i64> {
    path.map(|Path(id)| id)
        .map_err(|e| ApiError::bad_request(e.body_text()))
}

/// Turn a request body into a field map restricted to the customer columns.
fn customer_fields(body: Result<Json<serde_json::Value>, JsonRejection>) -> ApiResult<FieldMap> {
    let Json(body) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let serde_json::Value::Object(object) = body else {
        return Err(ApiError::bad_request("request body must be a JSON object"));
    };
    if let Some(column) = object
        .keys()
        .find(|k| !CUSTOMER_COLUMNS.contains(&k.as_str()))
    {
        return Err(ApiError::bad_request(format!("unknown column {column:?}")));
    }
    Ok(FieldMap::from_json_object(&object)?)
}

async fn create_customer<S: CustomerStore>(
    State(store): State<Arc<S>>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> ApiResult<Json<Envelope<Record>>> {
    let fields = customer_fields(body)?;
    let record = store.create(fields).await?;
    Ok(Json(Envelope::ok("Customer created", record)))
}

async fn get_customer<S: CustomerStore>(
    State(store): State<Arc<S>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Envelope<Record>>> {
    let id = customer_id(path)?;
    let record = store.find(id).await?.ok_or(ApiError::NotFound(id))?;
    Ok(Json(Envelope::ok("Customer retrieved", record)))
}

async fn update_customer<S: CustomerStore>(
    State(store): State<Arc<S>>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> ApiResult<Json<Envelope<Record>>> {
    let id = customer_id(path)?;
    let fields = customer_fields(body)?;
    let record = store
        .update(id, fields)
        .await?
        .ok_or(ApiError::NotFound(id))?;
    Ok(Json(Envelope::ok("Customer updated", record)))
}

async fn delete_customer<S: CustomerStore>(
    State(store): State<Arc<S>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Envelope<()>>> {
    let id = customer_id(path)?;
    if store.remove(id).await? == 0 {
        return Err(ApiError::NotFound(id));
    }
    Ok(Json(Envelope::message("Customer deleted")))
}
