//! Login and logout endpoints.

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::client::FosmisError;
use crate::results::{build_results_payload, GradingScheme};
use crate::scrape::course_reg::parse_course_registration_html;
use crate::server::types::ApiErrorType;
use crate::server::util::session_from_cookie_or_header;
use crate::types::AppState;

/// Body of POST /init.
#[derive(Debug, Deserialize)]
pub struct InitRequest {
    pub username: String,
    pub password: String,
    /// When both are present the first results payload is prefetched on the
    /// fresh session, saving the caller a second round trip.
    pub stnum: Option<String>,
    pub rlevel: Option<String>,
}

/// Portal usernames carry a leading `sc` that the results filter rejects.
fn strip_sc_prefix(stnum: &str) -> &str {
    match stnum.get(..2) {
        Some(prefix) if prefix.eq_ignore_ascii_case("sc") => &stnum[2..],
        _ => stnum,
    }
}

/// POST /init
///
/// Authenticates against the portal and hands the session id back both as
/// JSON and as a `PHPSESSID` cookie.
pub async fn post_init(State(s): State<Arc<AppState>>, Json(body): Json<InitRequest>) -> Response {
    info!(username = %body.username, "POST /init - Logging in");

    let session = match s.client.login(&body.username, &body.password).await {
        Ok(session) => session,
        Err(FosmisError::InvalidCredentials) => {
            warn!(username = %body.username, "Portal rejected credentials");
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid credentials" })),
            )
                .into_response();
        }
        Err(e) => {
            error!("Login failed: {}", e);
            return ApiErrorType::from((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Login failed",
                Some(e.to_string()),
            ))
            .into_response();
        }
    };

    let results = match (body.stnum.as_deref(), body.rlevel.as_deref()) {
        (Some(stnum), Some(rlevel)) if !stnum.is_empty() && !rlevel.is_empty() => {
            prefetch_results(&s, &session, strip_sc_prefix(stnum), rlevel).await
        }
        _ => None,
    };

    (
        StatusCode::OK,
        [(header::SET_COOKIE, format!("PHPSESSID={session}; Path=/"))],
        Json(json!({ "sessionId": session, "results": results })),
    )
        .into_response()
}

/// Builds the same payload GET /results would return. Failure is non-fatal;
/// the frontend falls back to fetching results itself.
async fn prefetch_results(
    s: &AppState,
    session: &str,
    stnum: &str,
    rlevel: &str,
) -> Option<Value> {
    let fetched = futures::try_join!(
        s.client.fetch_results_html(session, stnum, rlevel),
        s.client.fetch_course_registration_html(session),
    );

    let (results_html, course_reg_html) = match fetched {
        Ok(pages) => pages,
        Err(e) => {
            warn!(stnum, "Results prefetch after login failed: {}", e);
            return None;
        }
    };

    let registration = parse_course_registration_html(&course_reg_html);
    let payload = build_results_payload(
        &results_html,
        GradingScheme::shared(),
        Some(&registration.non_degree_set),
        Some(registration.total_confirmed_credits),
    );
    serde_json::to_value(payload).ok()
}

/// POST /logout
///
/// Drops any cached pages for the session and expires the cookie.
pub async fn post_logout(State(s): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(session) = session_from_cookie_or_header(&headers) {
        s.cache.purge_session(&session);
    }

    (
        StatusCode::OK,
        [(header::SET_COOKIE, "PHPSESSID=; Path=/; Max-Age=0")],
        Json(json!({ "message": "Logged out successfully" })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sc_prefix_stripped_case_insensitively() {
        assert_eq!(strip_sc_prefix("sc12345"), "12345");
        assert_eq!(strip_sc_prefix("SC12345"), "12345");
        assert_eq!(strip_sc_prefix("12345"), "12345");
        assert_eq!(strip_sc_prefix("s"), "s");
    }
}
