//! Portal homepage endpoint.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;
use tracing::{error, info};

use crate::scrape::home::parse_home_html;
use crate::server::types::ApiErrorType;
use crate::server::util::extract_session;
use crate::types::AppState;

/// GET /home-data
///
/// Scrapes the logged-in homepage for the student's name, mentor details,
/// ticker notices, and profile photo URL.
pub async fn get_home_data(State(s): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let session = extract_session(&headers).unwrap_or_default();

    info!("GET /home-data - Fetching homepage");

    match s.client.fetch_homepage_html(&session).await {
        Ok(html) => {
            let data = parse_home_html(&html, s.client.base_url());
            (StatusCode::OK, Json(data)).into_response()
        }
        Err(e) => {
            error!("GET /home-data failed: {}", e);
            ApiErrorType::from((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error fetching home data",
                Some(e.to_string()),
            ))
            .into_response()
        }
    }
}
