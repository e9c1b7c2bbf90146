//! Account entity model and DTOs.
//!
//! An account is a user's bound automation target (at most one per user).
//! Credentials and session cookies are never stored centrally; the row only
//! records session *validity* as observed by the executing agent.

use outpost_core::types::{Id, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::enums::{AccountHealthStatus, AccountValidationStatus};

/// A row from the `accounts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Id,
    pub user_id: Id,
    pub profile_url: String,
    pub display_name: String,
    pub validation_status: AccountValidationStatus,
    pub health_status: AccountHealthStatus,
    /// Explicit user-requested pause; consulted only by the risk oracle.
    pub user_paused: bool,
    pub session_valid_at: Option<Timestamp>,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `POST /api/v1/accounts`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccount {
    pub profile_url: String,
    pub display_name: String,
    pub metadata: Option<serde_json::Value>,
}

/// DTO for `PUT /api/v1/accounts/{id}/validation-status`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateValidationStatus {
    pub validation_status: AccountValidationStatus,
}

/// DTO for `PUT /api/v1/accounts/{id}/health-status`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHealthStatus {
    pub health_status: AccountHealthStatus,
}
