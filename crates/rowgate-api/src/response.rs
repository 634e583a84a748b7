//! Response envelope shared by every customer route.

use axum::http::StatusCode;
use serde::Serialize;

/// `{ "message": ..., "status": ..., "data": ... }`
///
/// `data` is omitted when there is nothing to return.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T: Serialize> {
    pub message: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            status: StatusCode::OK.as_u16(),
            data: Some(data),
        }
    }
}

impl Envelope<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: StatusCode::OK.as_u16(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn data_is_omitted_when_absent() {
        let body = serde_json::to_value(Envelope::message("Customer deleted")).unwrap();
        assert_eq!(body, json!({"message": "Customer deleted", "status": 200}));

        let body = serde_json::to_value(Envelope::ok("Customer retrieved", json!({"id": 1}))).unwrap();
        assert_eq!(body["data"]["id"], 1);
    }
}
