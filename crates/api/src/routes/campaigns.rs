use axum::routing::{get, post};
use axum::Router;

use crate::handlers::campaigns;
use crate::state::AppState;

/// Campaign routes, mounted at `/campaigns`.
///
/// ```text
/// POST /schedule                   schedule a campaign
/// GET  /status                     status (anonymous)
/// GET  /status/{retailer_id}       status for a retailer
/// GET  /preview/{retailer_id}      early preview
/// POST /opt-out/{retailer_id}      opt out
/// GET  /list                       asset packs (403 while locked)
/// POST /admin/unlock               admin unlock
/// POST /admin/lock                 admin lock
/// GET  /admin/status               admin dashboard
/// GET  /analytics                  analytics for the active campaign
/// GET  /analytics/{campaign_id}    analytics for a campaign
/// GET  /audit                      campaign audit trail
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/schedule", post(campaigns::schedule))
        .route("/status", get(campaigns::status))
        .route("/status/{retailer_id}", get(campaigns::status_for_retailer))
        .route("/preview/{retailer_id}", get(campaigns::preview))
        .route("/opt-out/{retailer_id}", post(campaigns::opt_out))
        .route("/list", get(campaigns::list))
        .route("/admin/unlock", post(campaigns::admin_unlock))
        .route("/admin/lock", post(campaigns::admin_lock))
        .route("/admin/status", get(campaigns::admin_status))
        .route("/analytics", get(campaigns::analytics))
        .route("/analytics/{campaign_id}", get(campaigns::analytics_for))
        .route("/audit", get(campaigns::audit))
}
