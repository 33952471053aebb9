use std::sync::Arc;

use spiral_events::{EmailDelivery, EventBus};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every field is a handle.
#[derive(Clone)]
pub struct AppState {
    /// In-memory store.
    pub pool: spiral_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Event bus for publishing platform events.
    pub event_bus: Arc<EventBus>,
    /// Outbound email channel (gift card delivery).
    pub mailer: Arc<EmailDelivery>,
}

impl AppState {
    pub fn new(pool: spiral_db::DbPool, config: ServerConfig, event_bus: Arc<EventBus>) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            event_bus,
            mailer: Arc::new(EmailDelivery::default()),
        }
    }
}
