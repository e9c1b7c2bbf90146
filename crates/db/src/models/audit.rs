//! Audit log entity model and DTOs.
//!
//! The audit sink is append-only and immutable; it records what happened but
//! never feeds a decision. Rows have no `updated_at`.

use outpost_core::types::{Id, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::enums::ActorType;

/// A single audit entry. Immutable once created.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: Id,
    /// Owning subsystem, e.g. `"dispatch"`, `"agents"`, `"accounts"`, `"risk"`.
    pub domain: String,
    pub event_type: String,
    pub entity_type: String,
    pub entity_id: Id,
    pub actor_type: ActorType,
    pub actor_id: Option<Id>,
    pub payload: serde_json::Value,
    pub timestamp: Timestamp,
}

/// Insert shape for a new audit entry; built in code, never deserialized
/// from the wire.
#[derive(Debug, Clone)]
pub struct CreateAuditEntry {
    pub domain: &'static str,
    pub event_type: String,
    pub entity_type: &'static str,
    pub entity_id: Id,
    pub actor_type: ActorType,
    pub actor_id: Option<Id>,
    pub payload: serde_json::Value,
}

/// Filter parameters for `GET /api/v1/audit`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditQuery {
    pub domain: Option<String>,
    pub event_type: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<Id>,
    pub actor_type: Option<ActorType>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    /// Maximum number of results. Defaults to 50, capped at 500.
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
