//! Audit emission helper.
//!
//! The sink is append-only and never a source of authority, so append
//! failures are logged and swallowed rather than failing the operation
//! that produced the event.

use outpost_db::models::audit::CreateAuditEntry;
use sqlx::PgPool;

use outpost_db::repositories::AuditRepo;

/// Append an audit entry, logging (but not propagating) failures.
pub async fn emit(pool: &PgPool, entry: CreateAuditEntry) {
    if let Err(e) = AuditRepo::append(pool, &entry).await {
        tracing::warn!(
            error = %e,
            domain = entry.domain,
            event_type = %entry.event_type,
            entity_id = %entry.entity_id,
            "Audit append failed"
        );
    }
}
