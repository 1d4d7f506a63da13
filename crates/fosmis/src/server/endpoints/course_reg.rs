//! Course registration endpoint.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::scrape::course_reg::parse_course_registration_html;
use crate::server::types::ApiErrorType;
use crate::server::util::extract_session;
use crate::types::AppState;

/// GET /course-registration
///
/// Scrapes the registration page into structured JSON: the running
/// semester's courses, every registered course, confirmed credit total,
/// offering departments, and the non-degree subject codes.
pub async fn get_course_registration(
    State(s): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    let session = extract_session(&headers).unwrap_or_default();

    info!("GET /course-registration - Fetching registration page");

    match s.client.fetch_course_registration_html(&session).await {
        Ok(html) => {
            let data = parse_course_registration_html(&html);
            (
                StatusCode::OK,
                Json(json!({
                    "currentSemester": data.current_semester,
                    "allCourses": data.all_courses,
                    "totalConfirmedCredits": data.total_confirmed_credits,
                    "departments": data.departments,
                    "nonDegreeSubjects": data.non_degree_set,
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!("GET /course-registration failed: {}", e);
            ApiErrorType::from((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error fetching course registration data",
                Some(e.to_string()),
            ))
            .into_response()
        }
    }
}
