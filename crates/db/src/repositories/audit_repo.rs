//! Repository for the `audit_log` table.
//!
//! Append-only: there is no update or delete path. Concurrent appends rely
//! on nothing beyond the database's own write serialization.

use outpost_core::types::new_id;
use sqlx::PgPool;

use crate::models::audit::{AuditEntry, AuditQuery, CreateAuditEntry};

const COLUMNS: &str = "\
    id, domain, event_type, entity_type, entity_id, actor_type, actor_id, \
    payload, timestamp";

/// Provides append and filtered-query operations for the audit log.
pub struct AuditRepo;

impl AuditRepo {
    /// Append one entry.
    pub async fn append(pool: &PgPool, entry: &CreateAuditEntry) -> Result<AuditEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_log \
                 (id, domain, event_type, entity_type, entity_id, actor_type, actor_id, payload) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditEntry>(&query)
            .bind(new_id())
            .bind(entry.domain)
            .bind(&entry.event_type)
            .bind(entry.entity_type)
            .bind(&entry.entity_id)
            .bind(entry.actor_type)
            .bind(&entry.actor_id)
            .bind(&entry.payload)
            .fetch_one(pool)
            .await
    }

    /// Query entries with optional filters, newest first.
    pub async fn query(pool: &PgPool, params: &AuditQuery) -> Result<Vec<AuditEntry>, sqlx::Error> {
        let limit = params.limit.unwrap_or(50).min(500);
        let offset = params.offset.unwrap_or(0);

        let query = format!(
            "SELECT {COLUMNS} FROM audit_log \
             WHERE ($1::TEXT IS NULL OR domain = $1) \
               AND ($2::TEXT IS NULL OR event_type = $2) \
               AND ($3::TEXT IS NULL OR entity_type = $3) \
               AND ($4::TEXT IS NULL OR entity_id = $4) \
               AND ($5::actor_type IS NULL OR actor_type = $5) \
               AND ($6::TIMESTAMPTZ IS NULL OR timestamp >= $6) \
               AND ($7::TIMESTAMPTZ IS NULL OR timestamp <= $7) \
             ORDER BY timestamp DESC, id ASC \
             LIMIT $8 OFFSET $9"
        );
        sqlx::query_as::<_, AuditEntry>(&query)
            .bind(&params.domain)
            .bind(&params.event_type)
            .bind(&params.entity_type)
            .bind(&params.entity_id)
            .bind(params.actor_type)
            .bind(params.from)
            .bind(params.to)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
