//! Session extraction and the student-number guard.

use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Student numbers blocked from viewing results.
const NO_ACCESS_STNUM: &[&str] = &[];

/// Deceased students get a memorial message instead of marks.
const DECEASED_STNUM: &[&str] = &["11845"];

/// Pulls the portal session id out of the Authorization header, tolerating
/// an optional `Bearer ` prefix.
pub fn extract_session(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let session = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
    if session.is_empty() {
        None
    } else {
        Some(session.to_string())
    }
}

/// Reads the PHPSESSID cookie, falling back to the Authorization header.
/// Logout accepts either, since the SPA sends whichever it still has.
pub fn session_from_cookie_or_header(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get(COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .map(str::trim)
                .find_map(|pair| pair.strip_prefix("PHPSESSID="))
                .filter(|session| !session.is_empty())
                .map(str::to_string)
        });
    from_cookie.or_else(|| extract_session(headers))
}

/// Validates and normalises the student number from the request.
///
/// Returns the number with a single leading zero stripped, or the response
/// to send instead: 400 when missing, 403 for blocked students, and a
/// memorial message for deceased students.
pub fn guard_student(stnum: Option<&str>) -> Result<String, Response> {
    let Some(stnum) = stnum.map(str::trim).filter(|s| !s.is_empty()) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Student number is required" })),
        )
            .into_response());
    };

    let stripped = stnum.strip_prefix('0').unwrap_or(stnum);

    // A leading zero bypasses the block list.
    if NO_ACCESS_STNUM.contains(&stripped) && !stnum.starts_with('0') {
        return Err((
            StatusCode::FORBIDDEN,
            Json(json!({ "message": "No access to results for this student number" })),
        )
            .into_response());
    }
    if DECEASED_STNUM.contains(&stripped) {
        return Err((
            StatusCode::OK,
            Json(json!({ "message": "Rest in Peace" })),
        )
            .into_response());
    }

    Ok(stripped.to_string())
}
