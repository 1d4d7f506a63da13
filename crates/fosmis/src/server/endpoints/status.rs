//! Health and liveness endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;

use crate::types::AppState;

/// GET /health
///
/// Reports process uptime and cache occupancy. Also the target of the
/// self keep-alive ping in deployed environments.
pub async fn get_health(State(s): State<Arc<AppState>>) -> Response {
    let cache = s.cache.stats();

    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "uptime": s.started_at.elapsed().as_secs(),
            "cache": {
                "entries": cache.active_entries,
            },
        })),
    )
        .into_response()
}
