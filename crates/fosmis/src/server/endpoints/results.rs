//! Results and GPA endpoints.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::results::{
    add_manual_subjects, build_results_payload, credit_totals_from_html, overrides_from_pairs,
    CreditTotals, GpaSummary, GradingScheme,
};
use crate::scrape::course_reg::parse_course_registration_html;
use crate::server::types::ApiErrorType;
use crate::server::util::{extract_session, guard_student};
use crate::types::AppState;

/// Query parameters shared by the results endpoints.
#[derive(Debug, Deserialize)]
pub struct ResultsQuery {
    pub stnum: Option<String>,
    pub rlevel: Option<String>,
}

/// GET /results
///
/// Fetches the results and course-registration pages concurrently and
/// returns the full parsed payload: GPAs, repeats, breakdowns, and the raw
/// HTML for clients that render the original table.
pub async fn get_results(
    State(s): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ResultsQuery>,
) -> Response {
    let session = extract_session(&headers).unwrap_or_default();
    let stnum = match guard_student(query.stnum.as_deref()) {
        Ok(stnum) => stnum,
        Err(early) => return early,
    };
    let rlevel = query.rlevel.unwrap_or_default();

    info!(stnum, rlevel, "GET /results - Fetching results");

    let fetched = futures::try_join!(
        s.client.fetch_results_html(&session, &stnum, &rlevel),
        s.client.fetch_course_registration_html(&session),
    );

    match fetched {
        Ok((results_html, course_reg_html)) => {
            let registration = parse_course_registration_html(&course_reg_html);
            let payload = build_results_payload(
                &results_html,
                GradingScheme::shared(),
                Some(&registration.non_degree_set),
                Some(registration.total_confirmed_credits),
            );
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(e) => {
            error!("GET /results failed: {}", e);
            ApiErrorType::from((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error fetching data",
                Some(e.to_string()),
            ))
            .into_response()
        }
    }
}

/// GET /creditresults
///
/// Returns flat grade-point and credit totals per department, without
/// overrides or non-degree exclusions.
pub async fn get_credit_results(
    State(s): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ResultsQuery>,
) -> Response {
    let session = extract_session(&headers).unwrap_or_default();
    let stnum = match guard_student(query.stnum.as_deref()) {
        Ok(stnum) => stnum,
        Err(early) => return early,
    };
    let rlevel = query.rlevel.unwrap_or_default();

    info!(stnum, rlevel, "GET /creditresults - Fetching credit totals");

    match s.client.fetch_results_html(&session, &stnum, &rlevel).await {
        Ok(html) => {
            let accum = credit_totals_from_html(&html, GradingScheme::shared(), None, None);
            (StatusCode::OK, Json(CreditTotals::from_accumulator(&accum))).into_response()
        }
        Err(e) => {
            error!("GET /creditresults failed: {}", e);
            ApiErrorType::from((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error fetching data",
                Some(e.to_string()),
            ))
            .into_response()
        }
    }
}

/// Parallel subject-code and grade lists, paired by index.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SubjectGradePairs {
    pub subjects: Vec<String>,
    pub grades: Vec<String>,
}

/// Body of POST /calculateGPA.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateGpaRequest {
    pub stnum: Option<String>,
    pub manual_subjects: Option<SubjectGradePairs>,
    pub repeated_subjects: Option<SubjectGradePairs>,
}

/// POST /calculateGPA
///
/// What-if GPA: re-grades named repeated subjects and adds hypothetical
/// subjects on top of the real transcript, always against level 4 results.
pub async fn post_calculate_gpa(
    State(s): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CalculateGpaRequest>,
) -> Response {
    let session = extract_session(&headers).unwrap_or_default();
    let stnum = body.stnum.as_deref().unwrap_or_default();
    let stnum = stnum.strip_prefix('0').unwrap_or(stnum);

    info!(stnum, "POST /calculateGPA - Calculating adjusted GPA");

    let fetched = futures::try_join!(
        s.client.fetch_results_html(&session, stnum, "4"),
        s.client.fetch_course_registration_html(&session),
    );

    let (results_html, course_reg_html) = match fetched {
        Ok(pages) => pages,
        Err(e) => {
            error!("POST /calculateGPA failed: {}", e);
            return ApiErrorType::from((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error calculating GPA",
                Some(e.to_string()),
            ))
            .into_response();
        }
    };

    let registration = parse_course_registration_html(&course_reg_html);
    let scheme = GradingScheme::shared();

    let overrides = body
        .repeated_subjects
        .as_ref()
        .map(|pairs| overrides_from_pairs(&pairs.subjects, &pairs.grades))
        .unwrap_or_default();

    let mut accum = credit_totals_from_html(
        &results_html,
        scheme,
        Some(&overrides),
        Some(&registration.non_degree_set),
    );

    if let Some(pairs) = body.manual_subjects.as_ref() {
        add_manual_subjects(&mut accum, scheme, &pairs.subjects, &pairs.grades);
    }

    (StatusCode::OK, Json(GpaSummary::from_accumulator(&accum))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calculate_gpa_request_accepts_camel_case_pairs() {
        let body: CalculateGpaRequest = serde_json::from_str(
            r#"{
                "stnum": "012345",
                "manualSubjects": { "subjects": ["MAT3013"], "grades": ["A"] },
                "repeatedSubjects": { "subjects": ["CHE1013"], "grades": ["B+"] }
            }"#,
        )
        .unwrap();

        assert_eq!(body.stnum.as_deref(), Some("012345"));
        assert_eq!(body.manual_subjects.unwrap().subjects, vec!["MAT3013"]);
        assert_eq!(body.repeated_subjects.unwrap().grades, vec!["B+"]);
    }

    #[test]
    fn pairs_default_to_empty_lists() {
        let pairs: SubjectGradePairs = serde_json::from_str("{}").unwrap();
        assert!(pairs.subjects.is_empty());
        assert!(pairs.grades.is_empty());
    }
}
