//! User entity model.
//!
//! Users are minted by the identity integration: an externally-authenticated
//! principal is resolved to (or provisioned as) an internal user row. No
//! credentials are stored here.

use outpost_core::types::{Id, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Id,
    pub email: String,
    pub created_at: Timestamp,
}
