//! Agent bearer-token model.
//!
//! Tokens are opaque random strings handed to the agent exactly once at
//! registration. Only the SHA-256 hash is persisted, so a database leak does
//! not compromise live agents, and token storage survives restarts.

use outpost_core::types::{Id, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `agent_tokens` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentToken {
    pub id: Id,
    pub agent_id: Id,
    pub account_id: Id,
    /// SHA-256 hex digest of the opaque token. Never serialized.
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
