use std::sync::Arc;

use axum::routing::{get, post};
use axum::{middleware as mw, Router};

use crate::server::endpoints::{auth, course_reg, home, notices, results, status};
use crate::server::middleware::*;
use crate::types::AppState;

mod endpoints;
mod middleware;
mod types;
mod util;

/// Creates a router that can be used by `axum`.
///
/// # Parameters
/// - `app_state`: The app server state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Router whose endpoints need a live portal session
    let session_router = Router::new()
        .route(
            "/course-registration",
            get(course_reg::get_course_registration),
        )
        .route("/notices", get(notices::get_notices))
        .route("/home-data", get(home::get_home_data))
        .layer(mw::from_fn(require_session));

    Router::new()
        .route("/health", get(status::get_health))
        .route("/init", post(auth::post_init))
        .route("/logout", post(auth::post_logout))
        .route("/results", get(results::get_results))
        .route("/creditresults", get(results::get_credit_results))
        .route("/calculateGPA", post(results::post_calculate_gpa))
        // The proxy stays open; embedded viewers cannot attach headers.
        .route("/notices/proxy", get(notices::get_notice_proxy))
        .merge(session_router)
        .layer(mw::from_fn_with_state(app_state.clone(), apply_cors))
        .with_state(app_state)
}
