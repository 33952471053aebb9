use axum::routing::{get, post};
use axum::Router;

use crate::handlers::test_suites;
use crate::state::AppState;

/// ```text
/// GET  /default        built-in suite
/// POST /run            run cases in-process
/// GET  /runs/latest    last stored run
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/default", get(test_suites::default_cases))
        .route("/run", post(test_suites::run))
        .route("/runs/latest", get(test_suites::latest_run))
}
