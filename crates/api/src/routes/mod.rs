//! Route definitions, one module per resource.

pub mod accounts;
pub mod agent_plane;
pub mod audit;
pub mod health;
pub mod jobs;
pub mod risk;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` control-plane route tree (user tokens).
///
/// ```text
/// /accounts/...   Account Registry
/// /jobs/...       Job Dispatcher (create + projections)
/// /risk/...       Risk Oracle
/// /audit          Audit sink projection
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/accounts", accounts::router())
        .nest("/jobs", jobs::router())
        .nest("/risk", risk::router())
        .nest("/audit", audit::router())
}

/// Build the `/agent` execution-plane route tree (agent tokens, except
/// the trust-bootstrapped register endpoint).
pub fn agent_routes() -> Router<AppState> {
    agent_plane::router()
}
