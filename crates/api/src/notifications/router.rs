//! Event-to-notification routing.
//!
//! [`NotificationRouter`] subscribes to the event bus. When a campaign goes
//! live it notifies retailers by email and push, then publishes
//! `campaign.notifications_sent` with the per-channel outcome.

use std::sync::Arc;

use serde_json::json;
use spiral_core::campaign::{EVENT_ACTIVATED, EVENT_NOTIFICATIONS_SENT};
use spiral_events::{EmailDelivery, EventBus, PlatformEvent, PushDelivery};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Mailing list that receives campaign launch notices.
const RETAILER_MAILING_LIST: &str = "retailers@spiral.local";

/// Push topic subscribed to by retailer devices.
const RETAILER_PUSH_TOPIC: &str = "retailers";

pub struct NotificationRouter {
    event_bus: Arc<EventBus>,
    email: EmailDelivery,
    push: PushDelivery,
}

impl NotificationRouter {
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self {
            event_bus,
            email: EmailDelivery::default(),
            push: PushDelivery,
        }
    }

    /// Run the routing loop until `cancel` fires or the bus closes.
    ///
    /// The router holds a bus handle to publish its own events, so it must
    /// be cancelled before the bus can close.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Notification router stopping");
                    break;
                }
                received = receiver.recv() => match received {
                    Ok(event) => self.route_event(&event).await,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "Notification router lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Event bus closed, notification router shutting down");
                        break;
                    }
                },
            }
        }
    }

    /// Handle one event. Events other than campaign activation are ignored.
    pub async fn route_event(&self, event: &PlatformEvent) {
        if event.event_type != EVENT_ACTIVATED {
            return;
        }

        let email_sent = match self.email.deliver(RETAILER_MAILING_LIST, event).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(error = %e, "Campaign email notification failed");
                false
            }
        };
        let push_sent = match self.push.deliver_event(RETAILER_PUSH_TOPIC, event).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(error = %e, "Campaign push notification failed");
                false
            }
        };

        let mut sent = PlatformEvent::new(EVENT_NOTIFICATIONS_SENT)
            .with_actor("notifications")
            .with_payload(json!({
                "email": email_sent,
                "push": push_sent,
                "trigger": event.payload.get("trigger"),
            }));
        if let (Some(kind), Some(id)) = (&event.source_entity_type, &event.source_entity_id) {
            sent = sent.with_source(kind.clone(), id);
        }
        self.event_bus.publish(sent);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
