use axum::routing::{get, post};
use axum::Router;

use crate::handlers::business_profile;
use crate::state::AppState;

/// ```text
/// POST /retailer-business-profile              submit
/// GET  /retailer-business-profile/analytics    bucket distributions
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/retailer-business-profile", post(business_profile::create))
        .route(
            "/retailer-business-profile/analytics",
            get(business_profile::analytics),
        )
}
