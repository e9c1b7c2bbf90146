//! Agent entity model and DTOs.
//!
//! An agent is a remote untrusted executor bound 1:1 to an account. At most
//! one non-terminated agent row may exist per account; re-registration
//! reuses the live row and rotates its token.

use outpost_core::types::{Id, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::enums::{AgentState, ReportedStatus};

/// A row from the `agents` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: Id,
    pub account_id: Id,
    pub state: AgentState,
    pub agent_version: String,
    pub platform: String,
    pub last_heartbeat_at: Option<Timestamp>,
    pub registered_at: Timestamp,
    pub terminated_at: Option<Timestamp>,
}

/// DTO for `POST /agent/register`.
///
/// Registration is trust-bootstrapped: the body must name a `(userId,
/// accountId)` pair that actually exists and is bound together.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAgent {
    pub user_id: Id,
    pub account_id: Id,
    pub agent_version: String,
    pub platform: String,
}

/// DTO for `POST /agent/heartbeat`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatRequest {
    pub account_id: Id,
    pub status: ReportedStatus,
    pub current_job_id: Option<Id>,
}
