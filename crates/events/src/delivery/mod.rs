//! Outbound notification channels.
//!
//! Both channels are simulated: a delivery validates its recipient and
//! emits a structured log line instead of talking to a provider.

pub mod email;
pub mod push;

/// Error type for notification delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The recipient address or device topic is unusable.
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    /// The message has nothing to send.
    #[error("Empty message for {0}")]
    EmptyMessage(String),
}
