//! Route definitions for the `/risk` resource.
//!
//! All endpoints require user authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::risk;
use crate::state::AppState;

/// Routes mounted at `/risk`.
///
/// ```text
/// POST   /rules               -> create_rule
/// GET    /rules               -> list_rules
/// POST   /violations          -> record_violation
/// GET    /violations          -> list_violations
/// POST   /acknowledge         -> acknowledge
/// GET    /score               -> get_score
/// POST   /score/recalculate   -> recalculate_score
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/rules", get(risk::list_rules).post(risk::create_rule))
        .route("/violations", get(risk::list_violations).post(risk::record_violation))
        .route("/acknowledge", post(risk::acknowledge))
        .route("/score", get(risk::get_score))
        .route("/score/recalculate", post(risk::recalculate_score))
}
