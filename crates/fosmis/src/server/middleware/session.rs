//! Guard for endpoints that cannot do anything without a portal session.

use crate::server::util::extract_session;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Rejects with 401 when no session id accompanies the request.
pub async fn require_session(request: Request, next: Next) -> Response {
    if extract_session(request.headers()).is_none() {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "No session" }))).into_response();
    }
    next.run(request).await
}
