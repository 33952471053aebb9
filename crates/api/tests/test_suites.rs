//! Integration tests for the in-process smoke test runner.

mod common;

use axum::http::StatusCode;
use common::{body_json, data, get, post_json};
use serde_json::json;

#[tokio::test]
async fn default_suite_passes_on_a_fresh_store() {
    let (app, _) = common::build_test_app();

    let cases = data(get(app.clone(), "/api/test-suites/default").await).await;
    let total = cases.as_array().unwrap().len();
    assert!(total > 0);

    let response = post_json(app.clone(), "/api/test-suites/run", json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let run = data(response).await;
    assert_eq!(run["summary"]["total"], total);
    assert_eq!(run["summary"]["failed"], 0, "run: {run}");

    let latest = data(get(app, "/api/test-suites/runs/latest").await).await;
    assert_eq!(latest["id"], run["id"]);
}

#[tokio::test]
async fn mismatched_status_is_reported_as_failed_or_warning() {
    let (app, _) = common::build_test_app();

    let run = data(
        post_json(
            app,
            "/api/test-suites/run",
            json!({
                "cases": [
                    { "id": "missing", "name": "Missing product", "path": "/api/products/1", "expectedStatus": 200 },
                    {
                        "id": "create",
                        "name": "Create product",
                        "method": "POST",
                        "path": "/api/products",
                        "expectedStatus": 200,
                        "body": { "name": "Lamp", "price": 10, "quantity": 3 }
                    }
                ]
            }),
        )
        .await,
    )
    .await;

    assert_eq!(run["results"][0]["status"], "failed");
    assert_eq!(run["results"][0]["observedStatus"], 404);
    assert_eq!(run["results"][1]["status"], "warning");
    assert_eq!(run["results"][1]["observedStatus"], 201);
    assert_eq!(run["summary"]["failed"], 1);
    assert_eq!(run["summary"]["warnings"], 1);
}

#[tokio::test]
async fn runner_rejects_recursive_and_empty_suites() {
    let (app, _) = common::build_test_app();

    let response = post_json(
        app.clone(),
        "/api/test-suites/run",
        json!({ "cases": [{ "id": "loop", "name": "Loop", "path": "/api/test-suites/default" }] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(app.clone(), "/api/test-suites/run", json!({ "cases": [] })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "At least one test case is required"
    );

    let response = get(app, "/api/test-suites/runs/latest").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
