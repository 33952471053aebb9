//! Mall events, RSVPs, admin DTOs and listing views.

use serde::{Deserialize, Serialize};
use spiral_core::mall_event::{EventSort, ModerationAction, RsvpStatus};
use spiral_core::types::{DbId, Timestamp};
use validator::Validate;

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// The mall hosting an event, as shown on listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MallInfo {
    pub name: String,
    pub location: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MallEvent {
    pub id: DbId,
    pub mall_id: String,
    pub title: String,
    pub description: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub image_url: Option<String>,
    pub event_type: String,
    /// Where inside the mall the event takes place.
    pub location: String,
    pub max_rsvp: i64,
    /// Seats held by confirmed or attended RSVPs.
    pub current_rsvp: i64,
    pub reward_points: i64,
    pub is_approved: bool,
    pub is_published: bool,
    pub created_at: Timestamp,
    pub mall: MallInfo,
}

impl MallEvent {
    /// Shoppers only see approved, published events.
    pub fn is_public(&self) -> bool {
        self.is_approved && self.is_published
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRsvp {
    pub id: DbId,
    pub event_id: DbId,
    pub user_id: DbId,
    pub status: RsvpStatus,
    pub rsvped_at: Timestamp,
    pub attended_at: Option<Timestamp>,
    pub reward_claimed: bool,
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// DTO for `POST /admin/events`. Times are RFC 3339.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMallEvent {
    #[validate(length(min = 1, message = "Mall id is required"))]
    pub mall_id: String,
    pub mall_name: Option<String>,
    pub mall_location: Option<String>,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub image_url: Option<String>,
    #[validate(length(min = 1, message = "Event type is required"))]
    pub event_type: String,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    #[validate(range(min = 1, max = 100_000, message = "Capacity must be between 1 and 100000"))]
    pub max_rsvp: Option<i64>,
    #[validate(range(min = 0, max = 10_000, message = "Reward must be between 0 and 10000 SPIRALs"))]
    pub reward_points: Option<i64>,
}

/// DTO for `POST /admin/events/{id}/moderate`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerateMallEvent {
    pub action: ModerationAction,
    /// Publish as part of an approval.
    #[serde(default)]
    pub published: bool,
}

/// Filters for the public listing. `upcoming` defaults to true.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventQuery {
    pub event_type: Option<String>,
    pub mall_id: Option<String>,
    pub location: Option<String>,
    pub upcoming: Option<bool>,
    pub sort: Option<EventSort>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

/// `?status=` for a user's RSVPs; absent or `all` lists everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RsvpQuery {
    pub status: Option<String>,
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct EventListing {
    pub events: Vec<MallEvent>,
    /// Matches before the limit was applied.
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MallEventDetail {
    #[serde(flatten)]
    pub event: MallEvent,
    pub user_rsvp_status: Option<RsvpStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RsvpWithEvent {
    #[serde(flatten)]
    pub rsvp: EventRsvp,
    pub event: Option<MallEvent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventRsvps {
    pub rsvps: Vec<EventRsvp>,
    pub total: usize,
}

/// Result of confirming attendance.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceReceipt {
    pub rsvp: EventRsvp,
    pub event_title: String,
    pub spirals_awarded: i64,
    /// The attendee's point balance after the award.
    pub spiral_balance: i64,
}
