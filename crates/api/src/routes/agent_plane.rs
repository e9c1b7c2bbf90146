//! Route definitions for the agent plane, mounted at `/agent`.
//!
//! Every endpoint except `register` requires an agent bearer token.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::agent_plane;
use crate::state::AppState;

/// Routes mounted at `/agent`.
///
/// ```text
/// POST   /register              -> register (trust-bootstrapped)
/// POST   /deregister            -> deregister
/// POST   /heartbeat             -> heartbeat
/// GET    /jobs                  -> pull_jobs
/// POST   /jobs/{jobId}/result   -> submit_result (idempotent)
/// POST   /events                -> record_event
/// POST   /screenshots           -> upload_screenshot
/// GET    /control-state         -> control_state
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(agent_plane::register))
        .route("/deregister", post(agent_plane::deregister))
        .route("/heartbeat", post(agent_plane::heartbeat))
        .route("/jobs", get(agent_plane::pull_jobs))
        .route("/jobs/{jobId}/result", post(agent_plane::submit_result))
        .route("/events", post(agent_plane::record_event))
        .route("/screenshots", post(agent_plane::upload_screenshot))
        .route("/control-state", get(agent_plane::control_state))
}
