//! Handlers for the mall event directory: public listing, RSVPs and admin
//! moderation and attendance.
//!
//! Shoppers identify themselves with the `x-user-id` header.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use spiral_core::mall_event::{
    RsvpStatus, EVENT_ATTENDANCE_CONFIRMED, EVENT_CREATED, EVENT_MODERATED,
    EVENT_RSVP_CANCELLED, EVENT_RSVP_CONFIRMED,
};
use spiral_core::types::DbId;
use spiral_db::models::mall_event::{
    AttendanceReceipt, CreateMallEvent, EventListing, EventQuery, EventRsvp, EventRsvps,
    MallEvent, MallEventDetail, ModerateMallEvent, RsvpQuery, RsvpWithEvent,
};
use spiral_db::repositories::MallEventRepo;
use spiral_events::PlatformEvent;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::admin::RequireAdmin;
use crate::state::AppState;

/// Header naming the shopper making the request.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The caller's user id, if the header is present.
fn viewer(headers: &HeaderMap) -> AppResult<Option<DbId>> {
    headers
        .get(USER_ID_HEADER)
        .map(|value| {
            value
                .to_str()
                .ok()
                .and_then(|v| v.trim().parse::<DbId>().ok())
                .ok_or_else(|| {
                    AppError::BadRequest(format!("{USER_ID_HEADER} must be a numeric user id"))
                })
        })
        .transpose()
}

fn require_user(headers: &HeaderMap) -> AppResult<DbId> {
    viewer(headers)?
        .ok_or_else(|| AppError::BadRequest(format!("{USER_ID_HEADER} header is required")))
}

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

/// GET /api/events
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<EventQuery>,
) -> AppResult<Json<EventListing>> {
    Ok(Json(
        MallEventRepo::list(&state.pool, &query, Utc::now()).await,
    ))
}

#[derive(Debug, Serialize)]
pub struct EventDetailResponse {
    pub event: MallEventDetail,
}

/// GET /api/events/{id}
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    headers: HeaderMap,
) -> AppResult<Json<EventDetailResponse>> {
    let event = MallEventRepo::detail(&state.pool, id, viewer(&headers)?).await?;
    Ok(Json(EventDetailResponse { event }))
}

// ---------------------------------------------------------------------------
// RSVPs
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct RsvpResponse {
    pub rsvp: EventRsvp,
    pub message: &'static str,
}

/// POST /api/events/{id}/rsvp
pub async fn rsvp(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    headers: HeaderMap,
) -> AppResult<Json<RsvpResponse>> {
    let user_id = require_user(&headers)?;
    let rsvp = MallEventRepo::rsvp(&state.pool, id, user_id, Utc::now()).await?;

    tracing::info!(event_id = id, user_id, "RSVP confirmed");
    state.event_bus.publish(
        PlatformEvent::new(EVENT_RSVP_CONFIRMED)
            .with_source("mall_event", id)
            .with_actor(user_id)
            .with_payload(json!({ "rsvpId": rsvp.id })),
    );

    Ok(Json(RsvpResponse {
        rsvp,
        message: "Successfully RSVP'd to event!",
    }))
}

/// DELETE /api/events/{id}/rsvp
pub async fn cancel_rsvp(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    headers: HeaderMap,
) -> AppResult<Json<RsvpResponse>> {
    let user_id = require_user(&headers)?;
    let rsvp = MallEventRepo::cancel_rsvp(&state.pool, id, user_id).await?;

    state.event_bus.publish(
        PlatformEvent::new(EVENT_RSVP_CANCELLED)
            .with_source("mall_event", id)
            .with_actor(user_id)
            .with_payload(json!({ "rsvpId": rsvp.id })),
    );

    Ok(Json(RsvpResponse {
        rsvp,
        message: "RSVP cancelled successfully",
    }))
}

#[derive(Debug, Serialize)]
pub struct UserRsvps {
    pub rsvps: Vec<RsvpWithEvent>,
}

/// GET /api/users/{user_id}/rsvps
pub async fn user_rsvps(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Query(query): Query<RsvpQuery>,
) -> AppResult<Json<UserRsvps>> {
    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(s) if s.eq_ignore_ascii_case("all") => None,
        Some(s) => Some(s.parse::<RsvpStatus>()?),
    };
    Ok(Json(UserRsvps {
        rsvps: MallEventRepo::rsvps_for_user(&state.pool, user_id, status).await,
    }))
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct EventWithMessage {
    pub event: MallEvent,
    pub message: String,
}

/// POST /api/admin/events
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateMallEvent>,
) -> AppResult<(StatusCode, Json<EventWithMessage>)> {
    input.validate()?;
    let event = MallEventRepo::create(&state.pool, &input, Utc::now()).await?;

    tracing::info!(event_id = event.id, title = %event.title, "Mall event created");
    state.event_bus.publish(
        PlatformEvent::new(EVENT_CREATED)
            .with_source("mall_event", event.id)
            .with_actor("admin")
            .with_payload(json!({ "mallId": event.mall_id, "title": event.title })),
    );

    Ok((
        StatusCode::CREATED,
        Json(EventWithMessage {
            event,
            message: "Event created successfully and is awaiting approval".into(),
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct PendingEvents {
    pub events: Vec<MallEvent>,
    pub total: usize,
}

/// GET /api/admin/events/pending
pub async fn pending(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<PendingEvents>> {
    let events = MallEventRepo::pending(&state.pool).await;
    Ok(Json(PendingEvents {
        total: events.len(),
        events,
    }))
}

/// POST /api/admin/events/{id}/moderate
pub async fn moderate(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<ModerateMallEvent>,
) -> AppResult<Json<EventWithMessage>> {
    let event = MallEventRepo::moderate(&state.pool, id, &input).await?;
    let verb = input.action.past_tense();

    tracing::info!(event_id = id, action = verb, published = event.is_published, "Mall event moderated");
    state.event_bus.publish(
        PlatformEvent::new(EVENT_MODERATED)
            .with_source("mall_event", id)
            .with_actor("admin")
            .with_payload(json!({
                "action": input.action,
                "isApproved": event.is_approved,
                "isPublished": event.is_published,
            })),
    );

    Ok(Json(EventWithMessage {
        event,
        message: format!("Event {verb} successfully"),
    }))
}

/// GET /api/admin/events/{id}/rsvps
pub async fn event_rsvps(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<EventRsvps>> {
    Ok(Json(MallEventRepo::event_rsvps(&state.pool, id).await?))
}

#[derive(Debug, Serialize)]
pub struct AttendanceResponse {
    #[serde(flatten)]
    pub receipt: AttendanceReceipt,
    pub message: String,
}

/// POST /api/admin/events/{event_id}/attendance/{user_id}
///
/// Marks the RSVP attended and credits the event reward to the attendee's
/// wallet.
pub async fn confirm_attendance(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path((event_id, user_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<AttendanceResponse>> {
    let receipt =
        MallEventRepo::confirm_attendance(&state.pool, event_id, user_id, Utc::now()).await?;

    tracing::info!(
        event_id,
        user_id,
        spirals = receipt.spirals_awarded,
        "Attendance confirmed"
    );
    state.event_bus.publish(
        PlatformEvent::new(EVENT_ATTENDANCE_CONFIRMED)
            .with_source("mall_event", event_id)
            .with_actor("admin")
            .with_payload(json!({
                "userId": user_id,
                "spiralsAwarded": receipt.spirals_awarded,
            })),
    );

    let message = format!(
        "Attendance confirmed! {} SPIRALs awarded.",
        receipt.spirals_awarded
    );
    Ok(Json(AttendanceResponse { receipt, message }))
}
