//! SPIRAL event bus and notification infrastructure.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the domain event envelope.
//! - [`AuditPersistence`]: background subscriber that writes every event to
//!   the audit trail.
//! - [`delivery`]: simulated outbound channels (email, push).

pub mod bus;
pub mod delivery;
pub mod persistence;

pub use bus::{EventBus, PlatformEvent};
pub use delivery::email::EmailDelivery;
pub use delivery::push::PushDelivery;
pub use delivery::DeliveryError;
pub use persistence::AuditPersistence;
