//! Integration tests for the mall event directory.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use common::{body_json, data, get, send, ADMIN_KEY};
use serde_json::{json, Value};
use spiral_api::handlers::mall_events::USER_ID_HEADER;
use spiral_core::mall_event::{EVENT_ATTENDANCE_CONFIRMED, EVENT_RSVP_CONFIRMED};
use spiral_db::seed::{seed_demo_data, DEMO_POINTS, DEMO_USER_ID};

async fn as_user(app: Router, method: Method, uri: &str, user_id: i64) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(USER_ID_HEADER, user_id.to_string())
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn as_admin(app: Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-admin-key", ADMIN_KEY);
    let body = match body {
        Some(body) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };
    send(app, builder.body(body).unwrap()).await
}

fn new_event() -> Value {
    json!({
        "mallId": "ridgedale",
        "mallName": "Ridgedale Center",
        "mallLocation": "Minnetonka",
        "title": "Sneaker Swap Meet",
        "description": "Trade and sell sneakers with local collectors",
        "startTime": "2999-03-01T17:00:00Z",
        "endTime": "2999-03-01T20:00:00Z",
        "eventType": "Fashion",
        "location": "Lower Level Court",
        "maxRsvp": 1,
        "rewardPoints": 30
    })
}

#[tokio::test]
async fn listing_shows_published_upcoming_events() {
    let (app, state) = common::build_test_app();
    seed_demo_data(&state.pool).await;

    let listing = data(get(app.clone(), "/api/events").await).await;
    assert_eq!(listing["total"], 4);
    let first = &listing["events"][0];
    assert_eq!(first["title"], "Holiday Fashion Show & Styling Workshop");
    assert_eq!(first["mall"]["name"], "Downtown Shopping Center");
    assert_eq!(first["currentRsvp"], 2);

    let by_reward = data(get(app.clone(), "/api/events?sort=rewards&limit=1").await).await;
    assert_eq!(by_reward["total"], 4);
    assert_eq!(by_reward["events"].as_array().unwrap().len(), 1);
    assert_eq!(by_reward["events"][0]["rewardPoints"], 20);

    let kids = data(get(app, "/api/events?eventType=kids&location=suburbs").await).await;
    assert_eq!(kids["total"], 1);
    assert_eq!(kids["events"][0]["eventType"], "Kids");
}

#[tokio::test]
async fn rsvp_and_cancel_round_trip() {
    let (app, state) = common::build_test_app();
    seed_demo_data(&state.pool).await;
    let mut events = state.event_bus.subscribe();

    let response = as_user(app.clone(), Method::POST, "/api/events/3/rsvp", 42).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = data(response).await;
    assert_eq!(body["rsvp"]["status"], "confirmed");
    assert_eq!(events.recv().await.unwrap().event_type, EVENT_RSVP_CONFIRMED);

    let response = as_user(app.clone(), Method::POST, "/api/events/3/rsvp", 42).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Already RSVP'd to this event");

    let detail = data(as_user(app.clone(), Method::GET, "/api/events/3", 42).await).await;
    assert_eq!(detail["event"]["userRsvpStatus"], "confirmed");
    assert_eq!(detail["event"]["currentRsvp"], 1);

    let mine = data(get(app.clone(), "/api/users/42/rsvps?status=confirmed").await).await;
    assert_eq!(mine["rsvps"][0]["event"]["title"], "Tech Innovation Showcase");

    let response = as_user(app.clone(), Method::DELETE, "/api/events/3/rsvp", 42).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = as_user(app.clone(), Method::DELETE, "/api/events/3/rsvp", 42).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "RSVP not found");

    let mine = data(get(app, "/api/users/42/rsvps?status=confirmed").await).await;
    assert!(mine["rsvps"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn rsvp_requires_a_user_and_a_public_event() {
    let (app, state) = common::build_test_app();
    seed_demo_data(&state.pool).await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/events/1/rsvp")
        .body(Body::empty())
        .unwrap();
    let response = send(app.clone(), request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "x-user-id header is required");

    // The fifth seeded event is still awaiting moderation.
    let response = as_user(app.clone(), Method::POST, "/api/events/5/rsvp", 42).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(app, "/api/users/42/rsvps?status=maybe").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_event_lifecycle_awards_attendance_points() {
    let (app, state) = common::build_test_app();
    seed_demo_data(&state.pool).await;
    let mut events = state.event_bus.subscribe();

    let response = as_admin(app.clone(), Method::POST, "/api/admin/events", Some(new_event())).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = data(response).await;
    let id = created["event"]["id"].as_i64().unwrap();
    assert_eq!(created["event"]["isApproved"], false);
    assert_eq!(created["event"]["rewardPoints"], 30);

    let pending = data(as_admin(app.clone(), Method::GET, "/api/admin/events/pending", None).await).await;
    assert_eq!(pending["total"], 2);

    let moderated = data(
        as_admin(
            app.clone(),
            Method::POST,
            &format!("/api/admin/events/{id}/moderate"),
            Some(json!({ "action": "approve", "published": true })),
        )
        .await,
    )
    .await;
    assert_eq!(moderated["message"], "Event approved successfully");
    assert_eq!(moderated["event"]["isPublished"], true);

    let rsvp_uri = format!("/api/events/{id}/rsvp");
    let response = as_user(app.clone(), Method::POST, &rsvp_uri, DEMO_USER_ID).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = as_user(app.clone(), Method::POST, &rsvp_uri, 2).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Event is full");

    let seats = data(
        as_admin(app.clone(), Method::GET, &format!("/api/admin/events/{id}/rsvps"), None).await,
    )
    .await;
    assert_eq!(seats["total"], 1);

    let attendance_uri = format!("/api/admin/events/{id}/attendance/{DEMO_USER_ID}");
    let receipt = data(as_admin(app.clone(), Method::POST, &attendance_uri, None).await).await;
    assert_eq!(receipt["spiralsAwarded"], 30);
    assert_eq!(receipt["spiralBalance"], DEMO_POINTS + 30);
    assert_eq!(receipt["rsvp"]["status"], "attended");
    assert_eq!(receipt["message"], "Attendance confirmed! 30 SPIRALs awarded.");

    let response = as_admin(app.clone(), Method::POST, &attendance_uri, None).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let wallet = data(get(app, &format!("/api/wallet/{DEMO_USER_ID}")).await).await;
    assert_eq!(wallet["spiralPoints"], DEMO_POINTS + 30);

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event.event_type);
    }
    assert!(seen.iter().any(|t| t == EVENT_ATTENDANCE_CONFIRMED));
}

#[tokio::test]
async fn admin_event_routes_need_the_key_and_valid_input() {
    let (app, _) = common::build_test_app();

    let response = get(app.clone(), "/api/admin/events/pending").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let mut backwards = new_event();
    backwards["endTime"] = json!("2999-03-01T16:00:00Z");
    let response = as_admin(app.clone(), Method::POST, "/api/admin/events", Some(backwards)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Event end time must be after its start time"
    );

    let mut bad_time = new_event();
    bad_time["startTime"] = json!("next tuesday");
    let response = as_admin(app.clone(), Method::POST, "/api/admin/events", Some(bad_time)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["details"][0]["field"], "startTime");

    let response = as_admin(
        app,
        Method::POST,
        "/api/admin/events/99/moderate",
        Some(json!({ "action": "archive" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["details"][0]["field"], "action");
}
