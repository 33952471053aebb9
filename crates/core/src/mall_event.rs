//! Mall event directory rules.
//!
//! Malls publish in-person events that shoppers RSVP to. A new event is
//! hidden until an admin approves and publishes it. Confirmed attendance
//! earns the event's SPIRAL reward exactly once.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Capacity used when an event is created without `maxRsvp`.
pub const DEFAULT_MAX_RSVP: i64 = 100;
/// Reward used when an event is created without `rewardPoints`.
pub const DEFAULT_REWARD_POINTS: i64 = 10;
/// Page size for the public listing.
pub const DEFAULT_EVENT_LIMIT: i64 = 20;

// ---------------------------------------------------------------------------
// RSVP status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsvpStatus {
    Confirmed,
    Cancelled,
    Attended,
}

impl RsvpStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RsvpStatus::Confirmed => "confirmed",
            RsvpStatus::Cancelled => "cancelled",
            RsvpStatus::Attended => "attended",
        }
    }

    /// Cancelled RSVPs do not hold a seat.
    pub fn holds_seat(self) -> bool {
        !matches!(self, RsvpStatus::Cancelled)
    }
}

impl FromStr for RsvpStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "confirmed" => Ok(RsvpStatus::Confirmed),
            "cancelled" => Ok(RsvpStatus::Cancelled),
            "attended" => Ok(RsvpStatus::Attended),
            other => Err(CoreError::Validation(format!(
                "Unknown RSVP status '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Listing order and moderation
// ---------------------------------------------------------------------------

/// Ordering for the public event listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSort {
    /// Soonest start first.
    #[default]
    Date,
    /// Most RSVPs first.
    Popular,
    /// Largest reward first.
    Rewards,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationAction {
    Approve,
    Reject,
}

impl ModerationAction {
    /// Past-tense verb used in responses.
    pub fn past_tense(self) -> &'static str {
        match self {
            ModerationAction::Approve => "approved",
            ModerationAction::Reject => "rejected",
        }
    }
}

/// Approval and publication flags after a moderation decision.
///
/// Approving without `publish` keeps the current publication flag. Rejecting
/// always unpublishes.
pub fn moderate(
    action: ModerationAction,
    publish: bool,
    is_published: bool,
) -> (bool, bool) {
    match action {
        ModerationAction::Approve => (true, is_published || publish),
        ModerationAction::Reject => (false, false),
    }
}

// ---------------------------------------------------------------------------
// Input rules
// ---------------------------------------------------------------------------

/// An event must end after it starts.
pub fn check_schedule(start: Timestamp, end: Timestamp) -> Result<(), CoreError> {
    if end <= start {
        return Err(CoreError::Validation(
            "Event end time must be after its start time".into(),
        ));
    }
    Ok(())
}

/// Seats left, never negative.
pub fn seats_left(max_rsvp: i64, current_rsvp: i64) -> i64 {
    (max_rsvp - current_rsvp).max(0)
}

// ---------------------------------------------------------------------------
// Event names
// ---------------------------------------------------------------------------

pub const EVENT_CREATED: &str = "mall_event.created";
pub const EVENT_MODERATED: &str = "mall_event.moderated";
pub const EVENT_RSVP_CONFIRMED: &str = "mall_event.rsvp_confirmed";
pub const EVENT_RSVP_CANCELLED: &str = "mall_event.rsvp_cancelled";
pub const EVENT_ATTENDANCE_CONFIRMED: &str = "mall_event.attendance_confirmed";

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Attended".parse::<RsvpStatus>().unwrap(), RsvpStatus::Attended);
        assert_eq!(" confirmed ".parse::<RsvpStatus>().unwrap(), RsvpStatus::Confirmed);
        assert_matches!("maybe".parse::<RsvpStatus>(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn only_cancelled_rsvps_release_their_seat() {
        assert!(RsvpStatus::Confirmed.holds_seat());
        assert!(RsvpStatus::Attended.holds_seat());
        assert!(!RsvpStatus::Cancelled.holds_seat());
    }

    #[test]
    fn moderation_flags() {
        assert_eq!(moderate(ModerationAction::Approve, false, false), (true, false));
        assert_eq!(moderate(ModerationAction::Approve, true, false), (true, true));
        assert_eq!(moderate(ModerationAction::Approve, false, true), (true, true));
        assert_eq!(moderate(ModerationAction::Reject, true, true), (false, false));
    }

    #[test]
    fn schedule_must_move_forward() {
        let start = Utc::now();
        assert!(check_schedule(start, start + Duration::hours(2)).is_ok());
        assert_matches!(check_schedule(start, start), Err(CoreError::Validation(_)));
        assert_matches!(
            check_schedule(start, start - Duration::minutes(1)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn seats_left_saturates() {
        assert_eq!(seats_left(10, 4), 6);
        assert_eq!(seats_left(10, 12), 0);
    }

    #[test]
    fn sort_defaults_to_date() {
        assert_eq!(EventSort::default(), EventSort::Date);
        let parsed: EventSort = serde_json::from_str("\"rewards\"").unwrap();
        assert_eq!(parsed, EventSort::Rewards);
    }
}
