//! Handlers for the campaign lifecycle: scheduling, retailer previews and
//! opt-outs, the gated pack list, admin controls and analytics.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use spiral_core::campaign::{
    LaunchTrigger, EVENT_ACTIVATED, EVENT_LOCKED, EVENT_OPT_OUT, EVENT_PREFIX,
    EVENT_PREVIEW_ACCESS, EVENT_SCHEDULED,
};
use spiral_db::models::audit::AuditEntry;
use spiral_db::models::campaign::{
    AdminStatus, CampaignAccess, CampaignAnalytics, CampaignList, CampaignPreview,
    CampaignStatusView, CampaignSummary, OptOutOutcome, OptOutRequest, ScheduleCampaign,
};
use spiral_db::repositories::{AuditRepo, CampaignRepo};
use spiral_events::PlatformEvent;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::handlers::optional_json;
use crate::middleware::admin::RequireAdmin;
use crate::query::LimitParams;
use crate::state::AppState;

/// Build the `campaign.activated` event for a campaign that just went live.
pub fn activation_event(campaign: &CampaignSummary, trigger: LaunchTrigger) -> PlatformEvent {
    let actor = match trigger {
        LaunchTrigger::Admin => "admin",
        LaunchTrigger::Schedule => "scheduler",
    };
    PlatformEvent::new(EVENT_ACTIVATED)
        .with_source("campaign", campaign.id)
        .with_actor(actor)
        .with_payload(json!({
            "campaignId": campaign.id,
            "title": campaign.title,
            "launchDate": campaign.launch_date,
            "trigger": trigger,
            "message": format!("{} is now live", campaign.title),
        }))
}

// ---------------------------------------------------------------------------
// Scheduling and status
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct Scheduled {
    pub campaign: CampaignSummary,
}

/// POST /api/campaigns/schedule
pub async fn schedule(
    State(state): State<AppState>,
    AppJson(input): AppJson<ScheduleCampaign>,
) -> AppResult<Json<Scheduled>> {
    input.validate()?;
    let campaign = CampaignRepo::schedule(&state.pool, &input).await?;

    tracing::info!(
        campaign_id = %campaign.id,
        title = %campaign.title,
        launch_date = %campaign.launch_date,
        "Campaign scheduled"
    );
    state.event_bus.publish(
        PlatformEvent::new(EVENT_SCHEDULED)
            .with_source("campaign", campaign.id)
            .with_actor("admin")
            .with_payload(json!({
                "title": campaign.title,
                "launchDate": campaign.launch_date,
            })),
    );

    Ok(Json(Scheduled { campaign }))
}

/// GET /api/campaigns/status
pub async fn status(State(state): State<AppState>) -> AppResult<Json<CampaignStatusView>> {
    Ok(Json(CampaignRepo::status(&state.pool, None, Utc::now()).await))
}

/// GET /api/campaigns/status/{retailer_id}
pub async fn status_for_retailer(
    State(state): State<AppState>,
    Path(retailer_id): Path<String>,
) -> AppResult<Json<CampaignStatusView>> {
    Ok(Json(
        CampaignRepo::status(&state.pool, Some(&retailer_id), Utc::now()).await,
    ))
}

// ---------------------------------------------------------------------------
// Retailer actions
// ---------------------------------------------------------------------------

/// GET /api/campaigns/preview/{retailer_id}
pub async fn preview(
    State(state): State<AppState>,
    Path(retailer_id): Path<String>,
) -> AppResult<Json<CampaignPreview>> {
    let grant = CampaignRepo::preview(&state.pool, &retailer_id).await?;

    if grant.first_access {
        tracing::info!(
            campaign_id = %grant.campaign_id,
            retailer_id = %retailer_id,
            "Early adopter preview access"
        );
        state.event_bus.publish(
            PlatformEvent::new(EVENT_PREVIEW_ACCESS)
                .with_source("campaign", grant.campaign_id)
                .with_actor(&retailer_id)
                .with_payload(json!({ "retailerId": retailer_id })),
        );
    }

    Ok(Json(grant.preview))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptOutResponse {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opt_out_confirmed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_opted_out: Option<bool>,
}

/// POST /api/campaigns/opt-out/{retailer_id}
///
/// The body is optional; an absent or empty body records the default
/// reason.
pub async fn opt_out(
    State(state): State<AppState>,
    Path(retailer_id): Path<String>,
    body: Bytes,
) -> AppResult<Json<OptOutResponse>> {
    let reason = optional_json::<OptOutRequest>(&body)?.reason;
    let outcome = CampaignRepo::opt_out(&state.pool, &retailer_id, reason.as_deref()).await?;

    let response = match outcome {
        OptOutOutcome::AlreadyOptedOut => OptOutResponse {
            message: "You have already opted out of this campaign.",
            opt_out_confirmed: None,
            already_opted_out: Some(true),
        },
        OptOutOutcome::Recorded {
            campaign_id,
            reason,
        } => {
            tracing::info!(
                campaign_id = %campaign_id,
                retailer_id = %retailer_id,
                reason = %reason,
                "Retailer opted out"
            );
            state.event_bus.publish(
                PlatformEvent::new(EVENT_OPT_OUT)
                    .with_source("campaign", campaign_id)
                    .with_actor(&retailer_id)
                    .with_payload(json!({ "retailerId": retailer_id, "reason": reason })),
            );
            OptOutResponse {
                message: "You have successfully opted out of this campaign.",
                opt_out_confirmed: Some(true),
                already_opted_out: None,
            }
        }
    };
    Ok(Json(response))
}

/// GET /api/campaigns/list
///
/// 403 with the locked state until the active campaign is due or an admin
/// has unlocked campaigns.
pub async fn list(State(state): State<AppState>) -> AppResult<Response> {
    match CampaignRepo::list(&state.pool, Utc::now()).await {
        CampaignAccess::Unlocked(list) => Ok(Json::<CampaignList>(list).into_response()),
        CampaignAccess::Locked(locked) => {
            let mut body = json!({
                "error": "Campaigns are currently locked. Contact SPIRAL Admin.",
                "code": "CAMPAIGNS_LOCKED",
                "locked": true,
            });
            if let (Some(target), Ok(serde_json::Value::Object(fields))) =
                (body.as_object_mut(), serde_json::to_value(&locked))
            {
                target.extend(fields);
            }
            Ok((StatusCode::FORBIDDEN, Json(body)).into_response())
        }
    }
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockResponse {
    pub message: &'static str,
    pub unlocked: bool,
    pub campaign_activated: bool,
}

/// POST /api/campaigns/admin/unlock
pub async fn admin_unlock(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<UnlockResponse>> {
    let outcome = CampaignRepo::admin_unlock(&state.pool).await;

    if let Some(campaign) = &outcome.launched {
        tracing::info!(campaign_id = %campaign.id, "Campaign activated by admin");
        state
            .event_bus
            .publish(activation_event(campaign, LaunchTrigger::Admin));
    }
    tracing::info!("Campaigns unlocked by admin");

    Ok(Json(UnlockResponse {
        message: "Social campaigns unlocked for all retailers nationwide!",
        unlocked: true,
        campaign_activated: outcome.campaign_activated,
    }))
}

#[derive(Debug, Serialize)]
pub struct LockResponse {
    pub message: &'static str,
    pub unlocked: bool,
}

/// POST /api/campaigns/admin/lock
pub async fn admin_lock(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<LockResponse>> {
    CampaignRepo::admin_lock(&state.pool).await;
    tracing::info!("Campaigns locked by admin");
    state
        .event_bus
        .publish(PlatformEvent::new(EVENT_LOCKED).with_actor("admin"));

    Ok(Json(LockResponse {
        message: "Social campaigns locked. Retailers will see locked state.",
        unlocked: false,
    }))
}

/// GET /api/campaigns/admin/status
pub async fn admin_status(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<AdminStatus>> {
    Ok(Json(CampaignRepo::admin_status(&state.pool).await))
}

// ---------------------------------------------------------------------------
// Analytics and audit
// ---------------------------------------------------------------------------

/// GET /api/campaigns/analytics
pub async fn analytics(State(state): State<AppState>) -> AppResult<Json<CampaignAnalytics>> {
    Ok(Json(CampaignRepo::analytics(&state.pool, None).await?))
}

/// GET /api/campaigns/analytics/{campaign_id}
pub async fn analytics_for(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
) -> AppResult<Json<CampaignAnalytics>> {
    Ok(Json(
        CampaignRepo::analytics(&state.pool, Some(&campaign_id)).await?,
    ))
}

/// GET /api/campaigns/audit
pub async fn audit(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> AppResult<Json<Vec<AuditEntry>>> {
    Ok(Json(
        AuditRepo::list_by_prefix(&state.pool, EVENT_PREFIX, params.limit).await,
    ))
}
