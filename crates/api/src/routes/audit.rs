//! Route definitions for the `/audit` resource (read-only).

use axum::routing::get;
use axum::Router;

use crate::handlers::audit;
use crate::state::AppState;

/// Routes mounted at `/audit`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(audit::query_audit))
}
