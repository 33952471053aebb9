//! Audit trail subscriber.
//!
//! [`AuditPersistence`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and writes every [`PlatformEvent`] to the audit table, emitting one
//! structured `audit` log line per event. It exits when the bus is dropped.

use spiral_db::models::audit::{AuditEntry, CreateAuditEntry};
use spiral_db::repositories::AuditRepo;
use spiral_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::PlatformEvent;

pub struct AuditPersistence;

impl AuditPersistence {
    /// Run the persistence loop until the channel closes.
    pub async fn run(store: DbPool, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    Self::persist(&store, event).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Audit persistence lagged, some events were not recorded"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, audit persistence shutting down");
                    break;
                }
            }
        }
    }

    /// Write a single event to the audit table.
    pub async fn persist(store: &DbPool, event: PlatformEvent) -> AuditEntry {
        let entry = AuditRepo::insert(
            store,
            CreateAuditEntry {
                event_type: event.event_type,
                source_entity_type: event.source_entity_type,
                source_entity_id: event.source_entity_id,
                actor: event.actor,
                payload: event.payload,
                occurred_at: event.timestamp,
            },
        )
        .await;

        tracing::info!(
            target: "audit",
            audit_id = entry.id,
            event_type = %entry.event_type,
            source_type = entry.source_entity_type.as_deref().unwrap_or("-"),
            source_id = entry.source_entity_id.as_deref().unwrap_or("-"),
            actor = entry.actor.as_deref().unwrap_or("-"),
            "audit"
        );
        entry
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
