//! Audit trail entries written from the event bus.

use serde::Serialize;
use spiral_core::types::{DbId, Timestamp};

/// One recorded platform event. Immutable once written.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: DbId,
    pub event_type: String,
    pub source_entity_type: Option<String>,
    pub source_entity_id: Option<String>,
    pub actor: Option<String>,
    pub payload: serde_json::Value,
    /// When the event happened.
    pub occurred_at: Timestamp,
    /// When the entry was written.
    pub recorded_at: Timestamp,
}

/// DTO for appending an audit entry.
#[derive(Debug, Clone)]
pub struct CreateAuditEntry {
    pub event_type: String,
    pub source_entity_type: Option<String>,
    pub source_entity_id: Option<String>,
    pub actor: Option<String>,
    pub payload: serde_json::Value,
    pub occurred_at: Timestamp,
}
