//! Handlers for retailer business profiles.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use spiral_db::models::business_profile::{BusinessProfile, CreateBusinessProfile, ProfileAnalytics};
use spiral_db::repositories::BusinessProfileRepo;
use spiral_events::PlatformEvent;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProfileCreated {
    pub profile: BusinessProfile,
}

/// POST /api/retailer-business-profile
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateBusinessProfile>,
) -> AppResult<(StatusCode, Json<ProfileCreated>)> {
    input.validate()?;
    let profile = BusinessProfileRepo::create(&state.pool, &input).await?;

    let mut event = PlatformEvent::new("retailer.profile_submitted")
        .with_source("business_profile", profile.id)
        .with_payload(serde_json::json!({
            "businessType": profile.business_type,
            "salesVolume": profile.sales_volume,
        }));
    if let Some(retailer) = &profile.retailer_id {
        event = event.with_actor(retailer);
    }
    state.event_bus.publish(event);

    Ok((StatusCode::CREATED, Json(ProfileCreated { profile })))
}

/// GET /api/retailer-business-profile/analytics
pub async fn analytics(State(state): State<AppState>) -> AppResult<Json<ProfileAnalytics>> {
    Ok(Json(BusinessProfileRepo::analytics(&state.pool).await))
}
