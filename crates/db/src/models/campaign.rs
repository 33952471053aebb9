//! Campaign entity, schedule DTO and the views returned by campaign queries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use spiral_core::campaign::{AssetPack, CampaignStatus};
use spiral_core::types::Timestamp;
use uuid::Uuid;
use validator::Validate;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptOut {
    pub retailer_id: String,
    pub reason: String,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: Uuid,
    pub title: String,
    pub launch_date: Timestamp,
    pub packs: Vec<String>,
    pub message: String,
    pub status: CampaignStatus,
    pub created_at: Timestamp,
    /// Retailers who opened the preview, in first-access order.
    pub early: Vec<String>,
    pub opt_outs: Vec<OptOut>,
}

impl Campaign {
    /// Status as seen by retailers: live once launched or past its date.
    pub fn effective_status(&self, now: Timestamp) -> CampaignStatus {
        if self.status == CampaignStatus::Live
            || spiral_core::campaign::is_due(self.launch_date, now)
        {
            CampaignStatus::Live
        } else {
            self.status
        }
    }

    pub fn has_opted_out(&self, retailer_id: &str) -> bool {
        self.opt_outs.iter().any(|o| o.retailer_id == retailer_id)
    }

    pub fn is_early_adopter(&self, retailer_id: &str) -> bool {
        self.early.iter().any(|r| r == retailer_id)
    }

    pub fn summary(&self) -> CampaignSummary {
        CampaignSummary {
            id: self.id,
            title: self.title.clone(),
            launch_date: self.launch_date,
            status: self.status,
        }
    }
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// DTO for `POST /campaigns/schedule`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleCampaign {
    #[validate(length(min = 1, message = "Launch date is required"))]
    pub launch_date: String,
    pub packs: Option<Vec<String>>,
    pub message: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptOutRequest {
    pub reason: Option<String>,
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignSummary {
    pub id: Uuid,
    pub title: String,
    pub launch_date: Timestamp,
    pub status: CampaignStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InactiveStatus {
    pub active: bool,
    pub unlocked: bool,
    pub last_updated: Timestamp,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveStatus {
    pub active: bool,
    pub campaign_id: Uuid,
    pub title: String,
    pub status: CampaignStatus,
    #[serde(flatten)]
    pub countdown: spiral_core::campaign::Countdown,
    pub unlocked: bool,
    pub opted_out: bool,
    pub early_adopter: bool,
    pub launch_date: Timestamp,
    pub message: String,
    pub last_updated: Timestamp,
}

/// Campaign status for a (possibly anonymous) retailer.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CampaignStatusView {
    Inactive(InactiveStatus),
    Active(Box<ActiveStatus>),
}

#[derive(Debug, Clone, Serialize)]
pub struct PreviewAsset {
    pub name: String,
    pub preview: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignPreview {
    pub preview_assets: Vec<PreviewAsset>,
    pub campaign_title: String,
    pub message: &'static str,
}

/// A preview handed to a retailer.
#[derive(Debug, Clone)]
pub struct PreviewGrant {
    pub campaign_id: Uuid,
    /// Whether this call recorded the retailer as an early adopter.
    pub first_access: bool,
    pub preview: CampaignPreview,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptOutOutcome {
    Recorded { campaign_id: Uuid, reason: String },
    AlreadyOptedOut,
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignList {
    pub campaigns: Vec<AssetPack>,
    pub total: usize,
}

/// Body of the 403 returned while campaigns are locked.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockedCampaigns {
    pub unlocked: bool,
    pub scheduled: bool,
    pub launch_date: Option<Timestamp>,
}

/// Campaign access, as decided by [`crate::repositories::CampaignRepo::list`].
#[derive(Debug, Clone)]
pub enum CampaignAccess {
    Unlocked(CampaignList),
    Locked(LockedCampaigns),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveCampaignInfo {
    pub id: Uuid,
    pub title: String,
    pub status: CampaignStatus,
    pub launch_date: Timestamp,
    pub early_adopters: usize,
    pub opt_outs: usize,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatus {
    pub unlocked: bool,
    pub active_campaign: Option<ActiveCampaignInfo>,
    pub scheduled_campaigns: usize,
    pub last_modified: Timestamp,
    pub total_campaign_packs: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignAnalytics {
    pub campaign_id: Uuid,
    pub title: String,
    pub status: CampaignStatus,
    pub total_early_adopters: usize,
    pub total_opt_outs: usize,
    pub opt_out_reasons: BTreeMap<String, usize>,
    pub early_adopter_list: Vec<String>,
    pub launch_date: Timestamp,
    pub created_at: Timestamp,
}

/// Result of an admin unlock.
#[derive(Debug, Clone)]
pub struct UnlockOutcome {
    /// An active campaign exists (and is now live).
    pub campaign_activated: bool,
    /// Set only when this unlock moved the campaign from scheduled to live.
    pub launched: Option<CampaignSummary>,
}
