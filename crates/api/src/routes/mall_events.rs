use axum::routing::{get, post};
use axum::Router;

use crate::handlers::mall_events;
use crate::state::AppState;

/// Mall event routes, merged at the `/api` root.
///
/// ```text
/// GET    /events                                   published events
/// GET    /events/{id}                              event detail
/// POST   /events/{id}/rsvp                         RSVP (x-user-id)
/// DELETE /events/{id}/rsvp                         cancel RSVP (x-user-id)
/// GET    /users/{user_id}/rsvps                    a user's RSVPs
/// POST   /admin/events                             create (admin)
/// GET    /admin/events/pending                     awaiting moderation (admin)
/// POST   /admin/events/{id}/moderate               approve or reject (admin)
/// GET    /admin/events/{id}/rsvps                  seats held (admin)
/// POST   /admin/events/{event_id}/attendance/{user_id}  confirm attendance (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(mall_events::list))
        .route("/events/{id}", get(mall_events::detail))
        .route(
            "/events/{id}/rsvp",
            post(mall_events::rsvp).delete(mall_events::cancel_rsvp),
        )
        .route("/users/{user_id}/rsvps", get(mall_events::user_rsvps))
        .route("/admin/events", post(mall_events::create))
        .route("/admin/events/pending", get(mall_events::pending))
        .route("/admin/events/{id}/moderate", post(mall_events::moderate))
        .route("/admin/events/{id}/rsvps", get(mall_events::event_rsvps))
        .route(
            "/admin/events/{event_id}/attendance/{user_id}",
            post(mall_events::confirm_attendance),
        )
}
