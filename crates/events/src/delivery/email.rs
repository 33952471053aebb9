//! Simulated email delivery.

use crate::bus::PlatformEvent;
use crate::delivery::DeliveryError;

/// Default sender address when none is configured.
const DEFAULT_FROM_ADDRESS: &str = "noreply@spiral.local";

/// A rendered email, returned so callers can inspect what was "sent".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailReceipt {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Renders notification emails and logs them in place of an SMTP send.
#[derive(Debug, Clone)]
pub struct EmailDelivery {
    from_address: String,
}

impl EmailDelivery {
    pub fn new(from_address: impl Into<String>) -> Self {
        Self {
            from_address: from_address.into(),
        }
    }

    /// Send a notification email describing `event`.
    pub async fn deliver(
        &self,
        to_email: &str,
        event: &PlatformEvent,
    ) -> Result<EmailReceipt, DeliveryError> {
        let subject = format!("[SPIRAL] {}", event.event_type);
        let body = format!(
            "Event: {}\nTime: {}\nDetails: {}",
            event.event_type,
            event.timestamp.to_rfc3339(),
            serde_json::to_string_pretty(&event.payload).unwrap_or_default()
        );
        self.send(to_email, subject, body).await
    }

    /// Send an arbitrary email.
    pub async fn send(
        &self,
        to_email: &str,
        subject: String,
        body: String,
    ) -> Result<EmailReceipt, DeliveryError> {
        if !looks_like_address(to_email) {
            return Err(DeliveryError::InvalidRecipient(to_email.to_string()));
        }
        if body.trim().is_empty() {
            return Err(DeliveryError::EmptyMessage(to_email.to_string()));
        }

        tracing::info!(
            channel = "email",
            from = %self.from_address,
            to = to_email,
            subject = %subject,
            "Notification email sent (simulated)"
        );
        Ok(EmailReceipt {
            from: self.from_address.clone(),
            to: to_email.to_string(),
            subject,
            body,
        })
    }
}

impl Default for EmailDelivery {
    fn default() -> Self {
        Self::new(DEFAULT_FROM_ADDRESS)
    }
}

fn looks_like_address(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
