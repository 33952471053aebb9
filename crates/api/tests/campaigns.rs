//! Integration tests for the campaign lifecycle.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{body_json, data, get, post_admin, post_json, ADMIN_KEY};
use serde_json::json;
use spiral_core::campaign::{EVENT_ACTIVATED, EVENT_SCHEDULED};
use spiral_events::AuditPersistence;

const FUTURE: &str = "2999-06-01T12:00:00Z";
const PAST: &str = "2020-01-01T00:00:00Z";

// ---------------------------------------------------------------------------
// Scheduling and status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_without_campaign_is_inactive() {
    let (app, _) = common::build_test_app();

    let status = data(get(app, "/api/campaigns/status").await).await;
    assert_eq!(status["active"], false);
    assert_eq!(status["unlocked"], false);
}

#[tokio::test]
async fn schedule_publishes_event_and_reports_countdown() {
    let (app, state) = common::build_test_app();
    let mut events = state.event_bus.subscribe();

    let response = post_json(
        app.clone(),
        "/api/campaigns/schedule",
        json!({ "launchDate": FUTURE, "title": "Holiday Push" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let campaign = data(response).await["campaign"].clone();
    assert_eq!(campaign["title"], "Holiday Push");
    assert_eq!(campaign["status"], "scheduled");

    let event = events.recv().await.unwrap();
    assert_eq!(event.event_type, EVENT_SCHEDULED);

    let status = data(get(app, "/api/campaigns/status/r-1").await).await;
    assert_eq!(status["active"], true);
    assert_eq!(status["status"], "scheduled");
    assert_eq!(status["unlocked"], false);
    assert_eq!(status["optedOut"], false);
    assert!(status["countdown"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn schedule_rejects_bad_launch_date() {
    let (app, _) = common::build_test_app();

    let response = post_json(
        app.clone(),
        "/api/campaigns/schedule",
        json!({ "launchDate": "next tuesday" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(app, "/api/campaigns/schedule", json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Locking
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_is_locked_until_admin_unlock() {
    let (app, state) = common::build_test_app();
    post_json(
        app.clone(),
        "/api/campaigns/schedule",
        json!({ "launchDate": FUTURE }),
    )
    .await;

    let response = get(app.clone(), "/api/campaigns/list").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "CAMPAIGNS_LOCKED");
    assert_eq!(json["data"]["locked"], true);
    assert_eq!(json["data"]["scheduled"], true);

    let mut events = state.event_bus.subscribe();
    let response = post_admin(app.clone(), "/api/campaigns/admin/unlock", Some(ADMIN_KEY)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let unlock = data(response).await;
    assert_eq!(unlock["unlocked"], true);
    assert_eq!(unlock["campaignActivated"], true);

    let event = events.recv().await.unwrap();
    assert_eq!(event.event_type, EVENT_ACTIVATED);
    assert_eq!(event.payload["trigger"], "admin");

    let list = data(get(app.clone(), "/api/campaigns/list").await).await;
    assert_eq!(list["total"], list["campaigns"].as_array().unwrap().len());

    // A second unlock does not re-activate.
    post_admin(app, "/api/campaigns/admin/unlock", Some(ADMIN_KEY)).await;
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn admin_endpoints_require_the_key() {
    let (app, _) = common::build_test_app();

    let response = post_admin(app.clone(), "/api/campaigns/admin/unlock", None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error"], "Admin key required");

    let response = post_admin(app.clone(), "/api/campaigns/admin/lock", Some("wrong")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error"], "Invalid admin key");

    let response = get(app, "/api/campaigns/admin/status").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_endpoints_are_open_without_a_configured_key() {
    let mut config = common::test_config();
    config.admin_api_key = None;
    let (app, _) = common::build_test_app_with(config);

    let response = post_admin(app.clone(), "/api/campaigns/admin/unlock", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(data(response).await["unlocked"], true);

    let response = get(app, "/api/campaigns/admin/status").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn admin_lock_keeps_live_campaign_live() {
    let (app, _) = common::build_test_app();
    post_json(
        app.clone(),
        "/api/campaigns/schedule",
        json!({ "launchDate": PAST }),
    )
    .await;

    let response = post_admin(app.clone(), "/api/campaigns/admin/lock", Some(ADMIN_KEY)).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Past launch date: still downloadable.
    let response = get(app, "/api/campaigns/list").await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Retailer actions and analytics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn preview_and_opt_out_feed_analytics() {
    let (app, _) = common::build_test_app();
    post_json(
        app.clone(),
        "/api/campaigns/schedule",
        json!({ "launchDate": FUTURE, "packs": ["TikTok Video Pack"] }),
    )
    .await;

    let preview = data(get(app.clone(), "/api/campaigns/preview/r-1").await).await;
    assert_eq!(preview["previewAssets"].as_array().unwrap().len(), 1);
    // A repeat preview does not double count.
    get(app.clone(), "/api/campaigns/preview/r-1").await;

    let response = post_json(
        app.clone(),
        "/api/campaigns/opt-out/r-2",
        json!({ "reason": "Too busy" }),
    )
    .await;
    assert_eq!(data(response).await["optOutConfirmed"], true);

    let response = post_json(app.clone(), "/api/campaigns/opt-out/r-2", json!({})).await;
    assert_eq!(data(response).await["alreadyOptedOut"], true);

    let analytics = data(get(app.clone(), "/api/campaigns/analytics").await).await;
    assert_eq!(analytics["totalEarlyAdopters"], 1);
    assert_eq!(analytics["totalOptOuts"], 1);
    assert_eq!(analytics["optOutReasons"]["Too busy"], 1);

    let status = data(get(app, "/api/campaigns/status/r-2").await).await;
    assert_eq!(status["optedOut"], true);
}

#[tokio::test]
async fn opt_out_without_campaign_is_404() {
    let (app, _) = common::build_test_app();

    let response = post_json(app, "/api/campaigns/opt-out/r-1", json!({})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Active campaign not found");
}

#[tokio::test]
async fn audit_trail_lists_persisted_campaign_events() {
    let (app, state) = common::build_test_app();
    let persistence = tokio::spawn(AuditPersistence::run(
        state.pool.clone(),
        state.event_bus.subscribe(),
    ));

    post_json(
        app.clone(),
        "/api/campaigns/schedule",
        json!({ "launchDate": FUTURE }),
    )
    .await;

    let mut entries = serde_json::Value::Null;
    for _ in 0..50 {
        entries = data(get(app.clone(), "/api/campaigns/audit").await).await;
        if !entries.as_array().unwrap().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(entries[0]["eventType"], EVENT_SCHEDULED);

    persistence.abort();
}
