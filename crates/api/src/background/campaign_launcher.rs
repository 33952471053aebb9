//! Periodic campaign launcher.
//!
//! Every tick marks each scheduled campaign whose launch date has passed as
//! live and publishes `campaign.activated` for it. Runs until `cancel` is
//! triggered.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use spiral_core::campaign::LaunchTrigger;
use spiral_core::types::Timestamp;
use spiral_db::repositories::CampaignRepo;
use spiral_db::DbPool;
use spiral_events::EventBus;
use tokio_util::sync::CancellationToken;

use crate::handlers::campaigns::activation_event;

/// Run the launcher loop.
pub async fn run(pool: DbPool, event_bus: Arc<EventBus>, tick: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = tick.as_secs(), "Campaign launcher started");

    let mut interval = tokio::time::interval(tick);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Campaign launcher stopping");
                break;
            }
            _ = interval.tick() => {
                let launched = launch_due(&pool, &event_bus, Utc::now()).await;
                if launched > 0 {
                    tracing::info!(launched, "Campaign launcher: campaigns went live");
                } else {
                    tracing::debug!("Campaign launcher: nothing due");
                }
            }
        }
    }
}

/// One launcher pass. Returns how many campaigns went live.
///
/// Events are published after the store lock is released.
pub async fn launch_due(pool: &DbPool, event_bus: &EventBus, now: Timestamp) -> usize {
    let launched = CampaignRepo::launch_due(pool, now).await;
    for campaign in &launched {
        tracing::info!(
            campaign_id = %campaign.id,
            title = %campaign.title,
            "Scheduled campaign is now live"
        );
        event_bus.publish(activation_event(campaign, LaunchTrigger::Schedule));
    }
    launched.len()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use spiral_core::campaign::EVENT_ACTIVATED;
    use spiral_db::models::campaign::{CampaignStatusView, ScheduleCampaign};
    use spiral_db::Store;

    fn schedule_at(launch_date: &str) -> ScheduleCampaign {
        ScheduleCampaign {
            launch_date: launch_date.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn due_campaign_goes_live_once() {
        let store = Store::default();
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        CampaignRepo::schedule(&store, &schedule_at("2020-01-01T00:00:00Z"))
            .await
            .unwrap();

        assert_eq!(launch_due(&store, &bus, Utc::now()).await, 1);
        assert_eq!(launch_due(&store, &bus, Utc::now()).await, 0);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, EVENT_ACTIVATED);
        assert_eq!(event.payload["trigger"], "schedule");
        assert!(rx.try_recv().is_err());

        match CampaignRepo::status(&store, None, Utc::now()).await {
            CampaignStatusView::Active(status) => assert!(status.unlocked),
            CampaignStatusView::Inactive(_) => panic!("expected an active campaign"),
        }
    }

    #[tokio::test]
    async fn future_campaign_stays_scheduled() {
        let store = Store::default();
        let bus = EventBus::default();
        CampaignRepo::schedule(&store, &schedule_at("2999-01-01T00:00:00Z"))
            .await
            .unwrap();
        assert_eq!(launch_due(&store, &bus, Utc::now()).await, 0);
    }

    #[tokio::test]
    async fn loop_stops_on_cancel() {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(
            Store::default(),
            Arc::new(EventBus::default()),
            Duration::from_millis(10),
            cancel.clone(),
        ));
        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
