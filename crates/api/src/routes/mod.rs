pub mod business_profile;
pub mod campaigns;
pub mod health;
pub mod mall_events;
pub mod products;
pub mod test_suites;
pub mod wallet;

use axum::middleware::from_fn;
use axum::Router;

use crate::response::envelope;
use crate::state::AppState;

/// Build the `/api` route tree, wrapped in the response envelope.
///
/// ```text
/// /products, /upload-csv, /inventory/*       catalog and inventory
/// /retailer-business-profile[/analytics]     onboarding profiles
/// /campaigns/*                               campaign lifecycle
/// /events/*, /users/*/rsvps, /admin/events/* mall event directory
/// /wallet/*                                  wallet and loyalty
/// /test-suites/*                             smoke test runner
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(products::router())
        .merge(business_profile::router())
        .merge(mall_events::router())
        .nest("/campaigns", campaigns::router())
        .nest("/wallet", wallet::router())
        .nest("/test-suites", test_suites::router())
        .layer(from_fn(envelope))
}
