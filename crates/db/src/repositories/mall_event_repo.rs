//! Repository for the mall event directory and RSVPs.

use spiral_core::error::CoreError;
use spiral_core::mall_event::{
    check_schedule, moderate, seats_left, EventSort, RsvpStatus, DEFAULT_EVENT_LIMIT,
    DEFAULT_MAX_RSVP, DEFAULT_REWARD_POINTS,
};
use spiral_core::types::{DbId, Timestamp};

use crate::models::mall_event::{
    AttendanceReceipt, CreateMallEvent, EventListing, EventQuery, EventRsvp, EventRsvps,
    MallEvent, MallEventDetail, MallInfo, ModerateMallEvent, RsvpWithEvent,
};
use crate::repositories::{clamp_limit, WalletRepo};
use crate::Store;

const ENTITY: &str = "Mall event";

pub struct MallEventRepo;

impl MallEventRepo {
    // ---- public directory ----

    /// Public events matching the query, ordered by `sort`.
    pub async fn list(store: &Store, query: &EventQuery, now: Timestamp) -> EventListing {
        let needle = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_lowercase)
        };
        let event_type = needle(&query.event_type);
        let location = needle(&query.location);
        let search = needle(&query.search);
        let mall_id = query.mall_id.as_deref().map(str::trim).filter(|m| !m.is_empty());
        let upcoming = query.upcoming.unwrap_or(true);

        let table = store.tables().mall_events.read().await;
        let mut events: Vec<&MallEvent> = table
            .events
            .values()
            .filter(|e| e.is_public())
            .filter(|e| {
                event_type
                    .as_deref()
                    .is_none_or(|t| e.event_type.to_lowercase().contains(t))
            })
            .filter(|e| mall_id.is_none_or(|m| e.mall_id == m))
            .filter(|e| {
                location.as_deref().is_none_or(|l| {
                    e.location.to_lowercase().contains(l)
                        || e.mall.location.to_lowercase().contains(l)
                })
            })
            .filter(|e| !upcoming || e.start_time > now)
            .filter(|e| {
                search.as_deref().is_none_or(|s| {
                    e.title.to_lowercase().contains(s)
                        || e.description.to_lowercase().contains(s)
                        || e.event_type.to_lowercase().contains(s)
                        || e.mall.name.to_lowercase().contains(s)
                })
            })
            .collect();

        match query.sort.unwrap_or_default() {
            EventSort::Date => events.sort_by_key(|e| (e.start_time, e.id)),
            EventSort::Popular => {
                events.sort_by(|a, b| b.current_rsvp.cmp(&a.current_rsvp).then(a.id.cmp(&b.id)))
            }
            EventSort::Rewards => {
                events.sort_by(|a, b| b.reward_points.cmp(&a.reward_points).then(a.id.cmp(&b.id)))
            }
        }

        let total = events.len();
        let limit = clamp_limit(Some(query.limit.unwrap_or(DEFAULT_EVENT_LIMIT)));
        EventListing {
            events: events.into_iter().take(limit).cloned().collect(),
            total,
        }
    }

    /// A public event, with the viewer's RSVP status when a viewer is known.
    pub async fn detail(
        store: &Store,
        id: DbId,
        viewer: Option<DbId>,
    ) -> Result<MallEventDetail, CoreError> {
        let table = store.tables().mall_events.read().await;
        let event = table
            .events
            .get(&id)
            .filter(|e| e.is_public())
            .ok_or_else(|| CoreError::not_found(ENTITY, id))?;
        let user_rsvp_status = viewer.and_then(|user| {
            table
                .rsvps
                .iter()
                .find(|r| r.event_id == id && r.user_id == user)
                .map(|r| r.status)
        });
        Ok(MallEventDetail {
            event: event.clone(),
            user_rsvp_status,
        })
    }

    // ---- RSVPs ----

    /// Reserve a seat. A cancelled RSVP is reactivated rather than
    /// duplicated.
    pub async fn rsvp(
        store: &Store,
        event_id: DbId,
        user_id: DbId,
        now: Timestamp,
    ) -> Result<EventRsvp, CoreError> {
        let mut table = store.tables().mall_events.write().await;
        let event = table
            .events
            .get(&event_id)
            .filter(|e| e.is_public())
            .ok_or_else(|| CoreError::not_found(ENTITY, event_id))?;

        let existing = table
            .rsvps
            .iter()
            .find(|r| r.event_id == event_id && r.user_id == user_id)
            .map(|r| r.status);
        if existing.is_some_and(RsvpStatus::holds_seat) {
            return Err(CoreError::Validation("Already RSVP'd to this event".into()));
        }
        if seats_left(event.max_rsvp, event.current_rsvp) == 0 {
            return Err(CoreError::Validation("Event is full".into()));
        }

        let rsvp = match table.rsvp_mut(event_id, user_id) {
            Some(rsvp) => {
                rsvp.status = RsvpStatus::Confirmed;
                rsvp.rsvped_at = now;
                rsvp.attended_at = None;
                rsvp.clone()
            }
            None => {
                let rsvp = EventRsvp {
                    id: table.rsvp_seq.next(),
                    event_id,
                    user_id,
                    status: RsvpStatus::Confirmed,
                    rsvped_at: now,
                    attended_at: None,
                    reward_claimed: false,
                };
                table.rsvps.push(rsvp.clone());
                rsvp
            }
        };
        if let Some(event) = table.events.get_mut(&event_id) {
            event.current_rsvp += 1;
        }
        Ok(rsvp)
    }

    /// Release a confirmed seat. Attended RSVPs cannot be cancelled.
    pub async fn cancel_rsvp(
        store: &Store,
        event_id: DbId,
        user_id: DbId,
    ) -> Result<EventRsvp, CoreError> {
        let mut table = store.tables().mall_events.write().await;
        let rsvp = table
            .rsvp_mut(event_id, user_id)
            .filter(|r| r.status.holds_seat())
            .ok_or_else(|| CoreError::missing("RSVP"))?;
        if rsvp.status == RsvpStatus::Attended {
            return Err(CoreError::Validation(
                "Attendance already confirmed for this event".into(),
            ));
        }
        rsvp.status = RsvpStatus::Cancelled;
        let cancelled = rsvp.clone();

        if let Some(event) = table.events.get_mut(&event_id) {
            event.current_rsvp = (event.current_rsvp - 1).max(0);
        }
        Ok(cancelled)
    }

    /// A user's RSVPs in booking order, each with its event.
    pub async fn rsvps_for_user(
        store: &Store,
        user_id: DbId,
        status: Option<RsvpStatus>,
    ) -> Vec<RsvpWithEvent> {
        let table = store.tables().mall_events.read().await;
        table
            .rsvps
            .iter()
            .filter(|r| r.user_id == user_id)
            .filter(|r| status.is_none_or(|s| r.status == s))
            .map(|r| RsvpWithEvent {
                rsvp: r.clone(),
                event: table.events.get(&r.event_id).cloned(),
            })
            .collect()
    }

    // ---- admin ----

    /// Create an event awaiting moderation.
    pub async fn create(
        store: &Store,
        input: &CreateMallEvent,
        now: Timestamp,
    ) -> Result<MallEvent, CoreError> {
        check_schedule(input.start_time, input.end_time)?;

        let location = input.location.trim().to_string();
        let mall = MallInfo {
            name: non_blank(input.mall_name.as_deref()).unwrap_or(input.mall_id.trim()).to_string(),
            location: non_blank(input.mall_location.as_deref())
                .unwrap_or(&location)
                .to_string(),
        };

        let mut table = store.tables().mall_events.write().await;
        let id = table.event_seq.next();
        let event = MallEvent {
            id,
            mall_id: input.mall_id.trim().to_string(),
            title: input.title.trim().to_string(),
            description: input.description.trim().to_string(),
            start_time: input.start_time,
            end_time: input.end_time,
            image_url: non_blank(input.image_url.as_deref()).map(str::to_string),
            event_type: input.event_type.trim().to_string(),
            location,
            max_rsvp: input.max_rsvp.unwrap_or(DEFAULT_MAX_RSVP),
            current_rsvp: 0,
            reward_points: input.reward_points.unwrap_or(DEFAULT_REWARD_POINTS),
            is_approved: false,
            is_published: false,
            created_at: now,
            mall,
        };
        table.events.insert(id, event.clone());
        Ok(event)
    }

    /// Events not yet approved, oldest first.
    pub async fn pending(store: &Store) -> Vec<MallEvent> {
        let table = store.tables().mall_events.read().await;
        table
            .events
            .values()
            .filter(|e| !e.is_approved)
            .cloned()
            .collect()
    }

    pub async fn moderate(
        store: &Store,
        id: DbId,
        input: &ModerateMallEvent,
    ) -> Result<MallEvent, CoreError> {
        let mut table = store.tables().mall_events.write().await;
        let event = table
            .events
            .get_mut(&id)
            .ok_or_else(|| CoreError::not_found(ENTITY, id))?;
        let (approved, published) = moderate(input.action, input.published, event.is_published);
        event.is_approved = approved;
        event.is_published = published;
        Ok(event.clone())
    }

    /// RSVPs currently holding a seat at an event.
    pub async fn event_rsvps(store: &Store, event_id: DbId) -> Result<EventRsvps, CoreError> {
        let table = store.tables().mall_events.read().await;
        if !table.events.contains_key(&event_id) {
            return Err(CoreError::not_found(ENTITY, event_id));
        }
        let rsvps: Vec<EventRsvp> = table
            .rsvps
            .iter()
            .filter(|r| r.event_id == event_id && r.status.holds_seat())
            .cloned()
            .collect();
        Ok(EventRsvps {
            total: rsvps.len(),
            rsvps,
        })
    }

    /// Mark an RSVP attended and credit the event's reward to the attendee.
    ///
    /// The reward is claimed under the event lock, so it is credited at most
    /// once per RSVP.
    pub async fn confirm_attendance(
        store: &Store,
        event_id: DbId,
        user_id: DbId,
        now: Timestamp,
    ) -> Result<AttendanceReceipt, CoreError> {
        let (rsvp, event_title, reward) = {
            let mut table = store.tables().mall_events.write().await;
            let (title, reward) = table
                .events
                .get(&event_id)
                .map(|e| (e.title.clone(), e.reward_points))
                .ok_or_else(|| CoreError::not_found(ENTITY, event_id))?;
            let rsvp = table
                .rsvp_mut(event_id, user_id)
                .filter(|r| r.status.holds_seat())
                .ok_or_else(|| CoreError::missing("RSVP"))?;
            if rsvp.reward_claimed {
                return Err(CoreError::Conflict(format!(
                    "Attendance already confirmed for user {user_id}"
                )));
            }
            rsvp.status = RsvpStatus::Attended;
            rsvp.attended_at = Some(now);
            rsvp.reward_claimed = true;
            (rsvp.clone(), title, reward)
        };

        let spiral_balance = WalletRepo::credit_points(
            store,
            user_id,
            reward,
            format!("Attended {event_title}"),
            now,
        )
        .await;

        Ok(AttendanceReceipt {
            rsvp,
            event_title,
            spirals_awarded: reward,
            spiral_balance,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
