//! Notice board endpoints.

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};
use url::Url;

use crate::scrape::notices::parse_notices_html;
use crate::server::types::ApiErrorType;
use crate::server::util::extract_session;
use crate::types::AppState;

/// GET /notices
///
/// Scrapes the notice board into recent and previous notices with resolved
/// attachment URLs.
pub async fn get_notices(State(s): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let session = extract_session(&headers).unwrap_or_default();

    info!("GET /notices - Fetching notice board");

    match s.client.fetch_notices_html(&session).await {
        Ok(html) => {
            let board = parse_notices_html(&html, s.client.base_url().as_str());
            (StatusCode::OK, Json(board)).into_response()
        }
        Err(e) => {
            error!("GET /notices failed: {}", e);
            ApiErrorType::from((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error fetching notices",
                Some(e.to_string()),
            ))
            .into_response()
        }
    }
}

/// Query parameters for the notice file proxy.
#[derive(Debug, Deserialize)]
pub struct ProxyQuery {
    pub url: Option<String>,
    /// Portal session forwarded as the `PHPSESSID` cookie upstream.
    pub session: Option<String>,
}

/// GET /notices/proxy?url=
///
/// Relays a notice file through the backend so browsers blocked by CORS can
/// still render attachments. HTML gets a `<base href>` injected so relative
/// assets resolve against the portal; everything else streams through
/// untouched.
pub async fn get_notice_proxy(
    State(s): State<Arc<AppState>>,
    Query(query): Query<ProxyQuery>,
) -> Response {
    let Some(url) = query.url.as_deref().filter(|url| !url.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing url parameter" })),
        )
            .into_response();
    };

    // Only files on the portal itself may be proxied.
    let allowed = Url::parse(url)
        .map(|parsed| parsed.origin() == s.client.base_url().origin())
        .unwrap_or(false);
    if !allowed {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "URL not allowed" })),
        )
            .into_response();
    }

    info!(url, "GET /notices/proxy - Relaying notice file");

    let upstream = match s
        .client
        .fetch_notice_file(url, query.session.as_deref())
        .await
    {
        Ok(upstream) => upstream,
        Err(e) => {
            error!("GET /notices/proxy failed: {}", e);
            return ApiErrorType::from((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error proxying file",
                Some(e.to_string()),
            ))
            .into_response();
        }
    };

    if !upstream.status().is_success() {
        let status =
            StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        return (status, Json(json!({ "error": "File not found" }))).into_response();
    }

    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let content_length = upstream
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    match content_type {
        Some(ct) if ct.contains("text/html") => {
            let html = match upstream.text().await {
                Ok(html) => html,
                Err(e) => {
                    error!("GET /notices/proxy failed reading body: {}", e);
                    return ApiErrorType::from((
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Error proxying file",
                        Some(e.to_string()),
                    ))
                    .into_response();
                }
            };

            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, ct)],
                inject_base_tag(&html, url),
            )
                .into_response()
        }
        content_type => {
            let mut builder = Response::builder().status(StatusCode::OK);
            if let Some(ct) = content_type {
                builder = builder.header(header::CONTENT_TYPE, ct);
            }
            if let Some(len) = content_length {
                builder = builder.header(header::CONTENT_LENGTH, len);
            }

            match builder.body(Body::from_stream(upstream.bytes_stream())) {
                Ok(response) => response,
                Err(e) => {
                    error!("GET /notices/proxy failed building response: {}", e);
                    ApiErrorType::from((
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Error proxying file",
                        Some(e.to_string()),
                    ))
                    .into_response()
                }
            }
        }
    }
}

/// Injects a `<base href>` right after the first `<head>`, or prepends one
/// when the document has no head tag.
fn inject_base_tag(html: &str, url: &str) -> String {
    let base_tag = format!(r#"<base href="{url}">"#);
    if html.contains("<head>") {
        html.replacen("<head>", &format!("<head>{base_tag}"), 1)
    } else {
        format!("{base_tag}{html}")
    }
}
