//! Repository for the campaign board.
//!
//! The board holds every scheduled campaign, the currently active one, and
//! the admin unlock flag. Status only ever moves `scheduled -> live`; no
//! method here can move it back.

use chrono::Utc;
use spiral_core::campaign::{
    parse_launch_date, preview_asset_path, tally_reasons, CampaignStatus, Countdown, ASSET_PACKS,
    DEFAULT_MESSAGE, DEFAULT_OPT_OUT_REASON, DEFAULT_PACKS, DEFAULT_TITLE,
};
use spiral_core::error::CoreError;
use spiral_core::types::Timestamp;
use uuid::Uuid;

use crate::models::campaign::{
    ActiveCampaignInfo, ActiveStatus, AdminStatus, Campaign, CampaignAccess, CampaignAnalytics,
    CampaignList, CampaignPreview, CampaignStatusView, CampaignSummary, InactiveStatus,
    LockedCampaigns, OptOut, OptOutOutcome, PreviewAsset, PreviewGrant, ScheduleCampaign,
    UnlockOutcome,
};
use crate::Store;

const PREVIEW_MESSAGE: &str = "You're getting early access to campaign materials!";

pub struct CampaignRepo;

impl CampaignRepo {
    /// Schedule a campaign and make it the active one.
    pub async fn schedule(
        store: &Store,
        input: &ScheduleCampaign,
    ) -> Result<CampaignSummary, CoreError> {
        let launch_date = parse_launch_date(&input.launch_date)?;
        let now = Utc::now();

        let campaign = Campaign {
            id: Uuid::new_v4(),
            title: non_blank(input.title.as_deref()).unwrap_or(DEFAULT_TITLE).to_string(),
            launch_date,
            packs: match &input.packs {
                Some(packs) if !packs.is_empty() => packs.clone(),
                _ => DEFAULT_PACKS.iter().map(|p| p.to_string()).collect(),
            },
            message: non_blank(input.message.as_deref())
                .unwrap_or(DEFAULT_MESSAGE)
                .to_string(),
            status: CampaignStatus::Scheduled,
            created_at: now,
            early: Vec::new(),
            opt_outs: Vec::new(),
        };
        let summary = campaign.summary();

        let mut board = store.tables().campaigns.write().await;
        board.active = Some(campaign.id);
        board.scheduled.push(campaign);
        board.touch();

        Ok(summary)
    }

    /// Status of the active campaign as seen by `retailer_id`.
    pub async fn status(
        store: &Store,
        retailer_id: Option<&str>,
        now: Timestamp,
    ) -> CampaignStatusView {
        let board = store.tables().campaigns.read().await;
        let Some(campaign) = board.active() else {
            return CampaignStatusView::Inactive(InactiveStatus {
                active: false,
                unlocked: board.admin_unlocked,
                last_updated: now,
            });
        };

        let status = campaign.effective_status(now);
        CampaignStatusView::Active(Box::new(ActiveStatus {
            active: true,
            campaign_id: campaign.id,
            title: campaign.title.clone(),
            status,
            countdown: Countdown::until(campaign.launch_date, now),
            unlocked: status == CampaignStatus::Live || board.admin_unlocked,
            opted_out: retailer_id.is_some_and(|r| campaign.has_opted_out(r)),
            early_adopter: retailer_id.is_some_and(|r| campaign.is_early_adopter(r)),
            launch_date: campaign.launch_date,
            message: campaign.message.clone(),
            last_updated: now,
        }))
    }

    /// Preview assets for a campaign that has not launched yet.
    ///
    /// The first call per retailer records them as an early adopter.
    pub async fn preview(store: &Store, retailer_id: &str) -> Result<PreviewGrant, CoreError> {
        let mut board = store.tables().campaigns.write().await;
        let campaign = board
            .active_mut()
            .filter(|c| c.status != CampaignStatus::Live)
            .ok_or_else(|| CoreError::missing("Campaign preview"))?;

        let first_access = !campaign.is_early_adopter(retailer_id);
        if first_access {
            campaign.early.push(retailer_id.to_string());
        }

        let preview = CampaignPreview {
            preview_assets: campaign
                .packs
                .iter()
                .map(|pack| PreviewAsset {
                    name: pack.clone(),
                    preview: preview_asset_path(pack),
                    description: format!("Preview of {pack}"),
                })
                .collect(),
            campaign_title: campaign.title.clone(),
            message: PREVIEW_MESSAGE,
        };
        Ok(PreviewGrant {
            campaign_id: campaign.id,
            first_access,
            preview,
        })
    }

    /// Record an opt-out. A repeat call for the same retailer changes
    /// nothing.
    pub async fn opt_out(
        store: &Store,
        retailer_id: &str,
        reason: Option<&str>,
    ) -> Result<OptOutOutcome, CoreError> {
        let mut board = store.tables().campaigns.write().await;
        let campaign = board
            .active_mut()
            .ok_or_else(|| CoreError::missing("Active campaign"))?;

        if campaign.has_opted_out(retailer_id) {
            return Ok(OptOutOutcome::AlreadyOptedOut);
        }

        let reason = non_blank(reason).unwrap_or(DEFAULT_OPT_OUT_REASON).to_string();
        campaign.opt_outs.push(OptOut {
            retailer_id: retailer_id.to_string(),
            reason: reason.clone(),
            timestamp: Utc::now(),
        });
        Ok(OptOutOutcome::Recorded {
            campaign_id: campaign.id,
            reason,
        })
    }

    /// Downloadable packs, or the locked state if the active campaign is not
    /// due and no admin unlock is in effect.
    pub async fn list(store: &Store, now: Timestamp) -> CampaignAccess {
        let board = store.tables().campaigns.read().await;
        let active = board.active();
        let due = active.is_some_and(|c| spiral_core::campaign::is_due(c.launch_date, now));

        if due || board.admin_unlocked {
            CampaignAccess::Unlocked(CampaignList {
                campaigns: ASSET_PACKS.to_vec(),
                total: ASSET_PACKS.len(),
            })
        } else {
            CampaignAccess::Locked(LockedCampaigns {
                unlocked: false,
                scheduled: active.is_some(),
                launch_date: active.map(|c| c.launch_date),
            })
        }
    }

    /// Set the admin unlock flag and launch the active campaign.
    pub async fn admin_unlock(store: &Store) -> UnlockOutcome {
        let mut board = store.tables().campaigns.write().await;
        board.admin_unlocked = true;
        board.touch();

        let Some(campaign) = board.active_mut() else {
            return UnlockOutcome {
                campaign_activated: false,
                launched: None,
            };
        };
        let launched = mark_live(campaign).then(|| campaign.summary());
        UnlockOutcome {
            campaign_activated: true,
            launched,
        }
    }

    /// Clear the admin unlock flag. Live campaigns stay live.
    pub async fn admin_lock(store: &Store) {
        let mut board = store.tables().campaigns.write().await;
        board.admin_unlocked = false;
        board.touch();
    }

    pub async fn admin_status(store: &Store) -> AdminStatus {
        let board = store.tables().campaigns.read().await;
        AdminStatus {
            unlocked: board.admin_unlocked,
            active_campaign: board.active().map(|c| ActiveCampaignInfo {
                id: c.id,
                title: c.title.clone(),
                status: c.status,
                launch_date: c.launch_date,
                early_adopters: c.early.len(),
                opt_outs: c.opt_outs.len(),
                created_at: c.created_at,
            }),
            scheduled_campaigns: board.scheduled.len(),
            last_modified: board.last_updated,
            total_campaign_packs: ASSET_PACKS.len(),
        }
    }

    /// Engagement figures for a campaign. An unknown or malformed id falls
    /// back to the active campaign.
    pub async fn analytics(
        store: &Store,
        campaign_id: Option<&str>,
    ) -> Result<CampaignAnalytics, CoreError> {
        let board = store.tables().campaigns.read().await;
        let requested = campaign_id
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .and_then(|id| board.scheduled.iter().find(|c| c.id == id));
        let campaign = requested
            .or_else(|| board.active())
            .ok_or_else(|| CoreError::missing("Campaign"))?;

        Ok(CampaignAnalytics {
            campaign_id: campaign.id,
            title: campaign.title.clone(),
            status: campaign.status,
            total_early_adopters: campaign.early.len(),
            total_opt_outs: campaign.opt_outs.len(),
            opt_out_reasons: tally_reasons(campaign.opt_outs.iter().map(|o| o.reason.as_str())),
            early_adopter_list: campaign.early.clone(),
            launch_date: campaign.launch_date,
            created_at: campaign.created_at,
        })
    }

    /// Launch every scheduled campaign whose date has passed.
    ///
    /// Returns the campaigns that transitioned in this call; a launch also
    /// sets the admin unlock flag.
    pub async fn launch_due(store: &Store, now: Timestamp) -> Vec<CampaignSummary> {
        let mut board = store.tables().campaigns.write().await;
        let launched: Vec<CampaignSummary> = board
            .scheduled
            .iter_mut()
            .filter(|c| spiral_core::campaign::is_due(c.launch_date, now))
            .filter_map(|c| mark_live(c).then(|| c.summary()))
            .collect();

        if !launched.is_empty() {
            board.admin_unlocked = true;
            board.touch();
        }
        launched
    }
}

/// Move a campaign to live. Returns `false` if it already was.
fn mark_live(campaign: &mut Campaign) -> bool {
    if campaign.status.can_transition_to(CampaignStatus::Live) {
        campaign.status = CampaignStatus::Live;
        true
    } else {
        false
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Duration;

    fn schedule_in(offset: Duration) -> ScheduleCampaign {
        ScheduleCampaign {
            launch_date: (Utc::now() + offset).to_rfc3339(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn schedule_applies_defaults_and_activates() {
        let store = Store::default();
        let summary = CampaignRepo::schedule(&store, &schedule_in(Duration::hours(1)))
            .await
            .unwrap();
        assert_eq!(summary.title, DEFAULT_TITLE);
        assert_eq!(summary.status, CampaignStatus::Scheduled);

        let admin = CampaignRepo::admin_status(&store).await;
        assert_eq!(admin.scheduled_campaigns, 1);
        assert_eq!(admin.active_campaign.unwrap().id, summary.id);
    }

    #[tokio::test]
    async fn schedule_rejects_bad_date() {
        let store = Store::default();
        let input = ScheduleCampaign {
            launch_date: "soon".into(),
            ..Default::default()
        };
        assert_matches!(
            CampaignRepo::schedule(&store, &input).await,
            Err(CoreError::Validation(_))
        );
    }

    #[tokio::test]
    async fn status_without_campaign_is_inactive() {
        let store = Store::default();
        assert_matches!(
            CampaignRepo::status(&store, None, Utc::now()).await,
            CampaignStatusView::Inactive(InactiveStatus { active: false, unlocked: false, .. })
        );
    }

    #[tokio::test]
    async fn opt_out_is_idempotent() {
        let store = Store::default();
        CampaignRepo::schedule(&store, &schedule_in(Duration::hours(1)))
            .await
            .unwrap();

        let first = CampaignRepo::opt_out(&store, "r1", None).await.unwrap();
        assert_matches!(first, OptOutOutcome::Recorded { ref reason, .. } if reason == DEFAULT_OPT_OUT_REASON);
        let second = CampaignRepo::opt_out(&store, "r1", Some("busy")).await.unwrap();
        assert_eq!(second, OptOutOutcome::AlreadyOptedOut);

        let analytics = CampaignRepo::analytics(&store, None).await.unwrap();
        assert_eq!(analytics.total_opt_outs, 1);
    }

    #[tokio::test]
    async fn opt_out_without_campaign_is_not_found() {
        let store = Store::default();
        assert_matches!(
            CampaignRepo::opt_out(&store, "r1", None).await,
            Err(CoreError::NotFound { .. })
        );
    }

    #[tokio::test]
    async fn preview_records_early_adopter_once() {
        let store = Store::default();
        CampaignRepo::schedule(&store, &schedule_in(Duration::hours(1)))
            .await
            .unwrap();

        let first = CampaignRepo::preview(&store, "r1").await.unwrap();
        assert!(first.first_access);
        assert_eq!(first.preview.preview_assets.len(), DEFAULT_PACKS.len());
        let again = CampaignRepo::preview(&store, "r1").await.unwrap();
        assert!(!again.first_access);

        let analytics = CampaignRepo::analytics(&store, None).await.unwrap();
        assert_eq!(analytics.early_adopter_list, vec!["r1".to_string()]);
    }

    #[tokio::test]
    async fn list_is_locked_until_due_or_unlocked() {
        let store = Store::default();
        CampaignRepo::schedule(&store, &schedule_in(Duration::hours(1)))
            .await
            .unwrap();

        assert_matches!(
            CampaignRepo::list(&store, Utc::now()).await,
            CampaignAccess::Locked(LockedCampaigns { scheduled: true, .. })
        );
        assert_matches!(
            CampaignRepo::list(&store, Utc::now() + Duration::hours(2)).await,
            CampaignAccess::Unlocked(_)
        );
    }

    #[tokio::test]
    async fn unlock_launches_and_lock_never_reverts() {
        let store = Store::default();
        CampaignRepo::schedule(&store, &schedule_in(Duration::hours(1)))
            .await
            .unwrap();

        let outcome = CampaignRepo::admin_unlock(&store).await;
        assert!(outcome.campaign_activated);
        assert!(outcome.launched.is_some());

        let repeat = CampaignRepo::admin_unlock(&store).await;
        assert!(repeat.launched.is_none());

        CampaignRepo::admin_lock(&store).await;
        let admin = CampaignRepo::admin_status(&store).await;
        assert!(!admin.unlocked);
        assert_eq!(admin.active_campaign.unwrap().status, CampaignStatus::Live);

        assert_matches!(
            CampaignRepo::preview(&store, "r2").await,
            Err(CoreError::NotFound { .. })
        );
    }

    #[tokio::test]
    async fn launch_due_transitions_each_campaign_once() {
        let store = Store::default();
        CampaignRepo::schedule(&store, &schedule_in(Duration::minutes(-5)))
            .await
            .unwrap();
        CampaignRepo::schedule(&store, &schedule_in(Duration::hours(3)))
            .await
            .unwrap();

        let now = Utc::now();
        let launched = CampaignRepo::launch_due(&store, now).await;
        assert_eq!(launched.len(), 1);
        assert!(CampaignRepo::admin_status(&store).await.unlocked);

        assert!(CampaignRepo::launch_due(&store, now).await.is_empty());
    }

    #[tokio::test]
    async fn analytics_falls_back_to_active_campaign() {
        let store = Store::default();
        assert_matches!(
            CampaignRepo::analytics(&store, None).await,
            Err(CoreError::NotFound { .. })
        );

        let summary = CampaignRepo::schedule(&store, &schedule_in(Duration::hours(1)))
            .await
            .unwrap();
        let analytics = CampaignRepo::analytics(&store, Some("not-a-uuid"))
            .await
            .unwrap();
        assert_eq!(analytics.campaign_id, summary.id);
    }
}
