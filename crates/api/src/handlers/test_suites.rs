//! Handlers for the in-process smoke test runner.
//!
//! A run replays each case against the API router (the same stack clients
//! hit, minus the network), sequentially, and stores the results.

use std::time::{Duration, Instant};

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, Method, Request};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use spiral_core::error::CoreError;
use spiral_core::test_suite::{default_suite, TestCase, TestResult, MAX_DELAY_MS};
use spiral_db::models::test_run::{CreateTestRun, TestRun};
use spiral_db::repositories::TestRunRepo;
use spiral_events::PlatformEvent;
use tower::ServiceExt;

use crate::error::{AppError, AppResult};
use crate::handlers::optional_json;
use crate::middleware::admin::ADMIN_KEY_HEADER;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSuiteRequest {
    /// Cases to run. The default suite when absent.
    pub cases: Option<Vec<TestCase>>,
    /// Pause between cases, capped at 5000.
    pub delay_ms: Option<u64>,
}

/// GET /api/test-suites/default
pub async fn default_cases() -> AppResult<Json<Vec<TestCase>>> {
    Ok(Json(default_suite()))
}

/// POST /api/test-suites/run
pub async fn run(State(state): State<AppState>, body: Bytes) -> AppResult<Json<TestRun>> {
    let request: RunSuiteRequest = optional_json(&body)?;
    let cases = request.cases.unwrap_or_else(default_suite);
    if cases.is_empty() {
        return Err(AppError::BadRequest(
            "At least one test case is required".into(),
        ));
    }
    for case in &cases {
        case.check().map_err(CoreError::Validation)?;
    }
    let delay = Duration::from_millis(request.delay_ms.unwrap_or(0).min(MAX_DELAY_MS));

    let started_at = Utc::now();
    let mut results = Vec::with_capacity(cases.len());
    for (index, case) in cases.iter().enumerate() {
        if index > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        results.push(execute(&state, case).await);
    }

    let run = TestRunRepo::insert(
        &state.pool,
        CreateTestRun {
            started_at,
            finished_at: Utc::now(),
            results,
        },
    )
    .await;

    tracing::info!(
        run_id = run.id,
        total = run.summary.total,
        passed = run.summary.passed,
        failed = run.summary.failed,
        warnings = run.summary.warnings,
        "Test suite run finished"
    );
    state.event_bus.publish(
        PlatformEvent::new("test_suite.completed")
            .with_source("test_run", run.id)
            .with_payload(json!(run.summary)),
    );

    Ok(Json(run))
}

/// GET /api/test-suites/runs/latest
pub async fn latest_run(State(state): State<AppState>) -> AppResult<Json<TestRun>> {
    let run = TestRunRepo::latest(&state.pool)
        .await
        .ok_or(AppError::Core(CoreError::missing("Test run")))?;
    Ok(Json(run))
}

/// Replay one case through the API router.
async fn execute(state: &AppState, case: &TestCase) -> TestResult {
    let started = Instant::now();
    let elapsed = || u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let request = match build_request(state, case) {
        Ok(request) => request,
        Err(message) => return TestResult::errored(case, message, elapsed()),
    };

    let timeout = Duration::from_secs(state.config.request_timeout_secs);
    let app = crate::router::api_service(state.clone());
    match tokio::time::timeout(timeout, app.oneshot(request)).await {
        Ok(Ok(response)) => TestResult::observed(case, response.status().as_u16(), elapsed()),
        Ok(Err(never)) => match never {},
        Err(_) => TestResult::errored(case, "Request timed out", elapsed()),
    }
}

fn build_request(state: &AppState, case: &TestCase) -> Result<Request<Body>, String> {
    let method = Method::from_bytes(case.method.to_ascii_uppercase().as_bytes())
        .map_err(|e| format!("Invalid method {}: {e}", case.method))?;

    let mut builder = Request::builder().method(method).uri(&case.path);
    if let Some(key) = state.config.admin_api_key.as_deref() {
        builder = builder.header(ADMIN_KEY_HEADER, key);
    }

    let body = match &case.body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    builder
        .body(body)
        .map_err(|e| format!("Could not build request: {e}"))
}
