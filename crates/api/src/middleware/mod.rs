//! Authentication extractors partitioning the API surface.
//!
//! Control-plane endpoints take [`auth::AuthUser`]; agent-plane endpoints
//! take [`agent::AuthAgent`]. A token of the wrong kind fails extraction
//! with `UNAUTHORIZED`.

pub mod agent;
pub mod auth;
