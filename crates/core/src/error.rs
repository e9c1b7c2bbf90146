use crate::types::Id;

/// Typed domain error raised by subsystem operations.
///
/// The API layer maps each variant onto the closed wire error-code set;
/// nothing below the wire layer knows about HTTP statuses.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: Id },

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Execution paused by risk policy: {0}")]
    RiskPaused(String),

    #[error("Account session invalid: {0}")]
    SessionInvalid(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
