//! Route definitions for the `/accounts` resource.
//!
//! All endpoints require user authentication.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::accounts;
use crate::state::AppState;

/// Routes mounted at `/accounts`.
///
/// ```text
/// POST   /                          -> create_account
/// GET    /me                        -> get_my_account
/// GET    /{id}                      -> get_account
/// GET    /{id}/agent                -> get_account_agent
/// PUT    /{id}/validation-status    -> update_validation_status
/// PUT    /{id}/health-status        -> update_health_status
/// POST   /{id}/session-valid        -> mark_session_valid
/// POST   /{id}/pause                -> pause
/// POST   /{id}/resume               -> resume
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(accounts::create_account))
        .route("/me", get(accounts::get_my_account))
        .route("/{id}", get(accounts::get_account))
        .route("/{id}/agent", get(accounts::get_account_agent))
        .route("/{id}/validation-status", put(accounts::update_validation_status))
        .route("/{id}/health-status", put(accounts::update_health_status))
        .route("/{id}/session-valid", post(accounts::mark_session_valid))
        .route("/{id}/pause", post(accounts::pause))
        .route("/{id}/resume", post(accounts::resume))
}
