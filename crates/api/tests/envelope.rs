//! Integration tests for the `/api` response envelope.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::middleware::from_fn;
use axum::routing::get as get_route;
use axum::Router;
use common::{body_bytes, body_json, get, send};
use spiral_api::response::{envelope, is_enveloped, Envelope};

const PRE_WRAPPED: &str = r#"{"success":false,"data":{"retry":true},"error":"Upstream busy","timestamp":"2025-01-01T00:00:00.000Z","duration":7}"#;

#[tokio::test]
async fn success_bodies_are_wrapped() {
    let (app, _) = common::build_test_app();

    let json = body_json(get(app, "/api/inventory/stats").await).await;
    assert!(is_enveloped(&json));
    assert_eq!(json["success"], true);
    assert!(json["error"].is_null());
    assert_eq!(json["data"]["totalProducts"], 0);
    assert!(json["duration"].is_u64());
    assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn extra_error_fields_move_into_data() {
    let (app, _) = common::build_test_app();

    let json = body_json(get(app, "/api/campaigns/list").await).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "CAMPAIGNS_LOCKED");
    assert_eq!(json["data"]["locked"], true);
    assert!(json["data"].get("error").is_none());
}

#[tokio::test]
async fn malformed_json_is_wrapped_as_bad_request() {
    let (app, _) = common::build_test_app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/products")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = send(app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].as_str().unwrap().starts_with("Invalid JSON body"));
    assert!(json["data"].is_null());
}

#[tokio::test]
async fn plain_text_rejections_are_wrapped() {
    let (app, _) = common::build_test_app();

    let request = Request::builder()
        .method(Method::PATCH)
        .uri("/api/products")
        .body(Body::empty())
        .unwrap();
    let response = send(app, request).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Method Not Allowed");
    assert!(json["data"].is_null());
}

#[tokio::test]
async fn pre_wrapped_bodies_pass_through_unchanged() {
    let app = Router::new()
        .route(
            "/wrapped",
            get_route(|| async {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    [(header::CONTENT_TYPE, "application/json")],
                    PRE_WRAPPED,
                )
            }),
        )
        .layer(from_fn(envelope));

    let response = get(app, "/wrapped").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_bytes(response).await, PRE_WRAPPED.as_bytes());
}

#[test]
fn wrapping_an_error_defaults_the_message() {
    let envelope = Envelope::wrap(StatusCode::NOT_FOUND, serde_json::json!({}), 3);
    assert!(!envelope.success);
    assert_eq!(envelope.error.as_deref(), Some("Not Found"));
    assert!(envelope.data.is_null());
    assert_eq!(envelope.duration, 3);
}
