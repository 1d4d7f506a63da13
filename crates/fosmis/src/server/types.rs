//! Response helpers shared by the API endpoints.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// A JSON API error: `{"message": ...}` plus an optional detail string.
#[derive(Debug)]
pub struct ApiErrorType {
    pub status: StatusCode,
    pub message: String,
    pub detail: Option<String>,
}

impl From<(StatusCode, &str)> for ApiErrorType {
    fn from((status, message): (StatusCode, &str)) -> Self {
        Self {
            status,
            message: message.to_string(),
            detail: None,
        }
    }
}

impl From<(StatusCode, &str, Option<String>)> for ApiErrorType {
    fn from((status, message, detail): (StatusCode, &str, Option<String>)) -> Self {
        Self {
            status,
            message: message.to_string(),
            detail,
        }
    }
}

impl IntoResponse for ApiErrorType {
    fn into_response(self) -> Response {
        let body = match self.detail {
            Some(detail) => json!({ "message": self.message, "detail": detail }),
            None => json!({ "message": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}
