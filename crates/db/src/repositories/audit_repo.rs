//! Repository for the append-only audit trail.

use chrono::Utc;

use crate::models::audit::{AuditEntry, CreateAuditEntry};
use crate::repositories::clamp_limit;
use crate::Store;

pub struct AuditRepo;

impl AuditRepo {
    pub async fn insert(store: &Store, input: CreateAuditEntry) -> AuditEntry {
        let mut table = store.tables().audit.write().await;
        let entry = AuditEntry {
            id: table.seq.next(),
            event_type: input.event_type,
            source_entity_type: input.source_entity_type,
            source_entity_id: input.source_entity_id,
            actor: input.actor,
            payload: input.payload,
            occurred_at: input.occurred_at,
            recorded_at: Utc::now(),
        };
        table.rows.push(entry.clone());
        entry
    }

    /// Entries whose event type starts with `prefix`, newest first.
    pub async fn list_by_prefix(
        store: &Store,
        prefix: &str,
        limit: Option<i64>,
    ) -> Vec<AuditEntry> {
        let table = store.tables().audit.read().await;
        table
            .rows
            .iter()
            .rev()
            .filter(|e| e.event_type.starts_with(prefix))
            .take(clamp_limit(limit))
            .cloned()
            .collect()
    }

    pub async fn count(store: &Store) -> usize {
        store.tables().audit.read().await.rows.len()
    }
}
