//! Simulated push delivery to a topic of subscribed devices.

use crate::bus::PlatformEvent;
use crate::delivery::DeliveryError;

/// A push notice as it would be handed to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushNotice {
    pub topic: String,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Default)]
pub struct PushDelivery;

impl PushDelivery {
    /// Broadcast `title`/`body` to every device subscribed to `topic`.
    pub async fn deliver(
        &self,
        topic: &str,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<PushNotice, DeliveryError> {
        if topic.trim().is_empty() || topic.contains(char::is_whitespace) {
            return Err(DeliveryError::InvalidRecipient(topic.to_string()));
        }
        let notice = PushNotice {
            topic: topic.to_string(),
            title: title.into(),
            body: body.into(),
        };
        if notice.body.trim().is_empty() {
            return Err(DeliveryError::EmptyMessage(topic.to_string()));
        }

        tracing::info!(
            channel = "push",
            topic = %notice.topic,
            title = %notice.title,
            "Push notification sent (simulated)"
        );
        Ok(notice)
    }

    /// Push a one-line summary of `event`.
    pub async fn deliver_event(
        &self,
        topic: &str,
        event: &PlatformEvent,
    ) -> Result<PushNotice, DeliveryError> {
        let body = event
            .payload
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| event.event_type.clone());
        self.deliver(topic, format!("SPIRAL: {}", event.event_type), body)
            .await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
