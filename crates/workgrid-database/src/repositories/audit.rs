//! Audit log repository. Insert and query only; rows are never updated.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use workgrid_core::result::AppResult;
use workgrid_core::types::pagination::PageRequest;
use workgrid_entity::audit::{AuditFilter, AuditLogEntry, CreateAuditLogEntry};

use super::db_err;
use crate::store::AuditStore;

const FILTER_CLAUSE: &str = "WHERE ($1::text IS NULL OR action = $1) \
     AND ($2::uuid IS NULL OR actor_id = $2) \
     AND ($3::text IS NULL OR target_type = $3) \
     AND ($4::timestamptz IS NULL OR created_at >= $4) \
     AND ($5::timestamptz IS NULL OR created_at <= $5)";

/// PostgreSQL-backed [`AuditStore`].
#[derive(Debug, Clone)]
pub struct PgAuditRepository {
    pool: PgPool,
}

impl PgAuditRepository {
    /// Create a new audit repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditStore for PgAuditRepository {
    async fn append(&self, entry: CreateAuditLogEntry) -> AppResult<AuditLogEntry> {
        sqlx::query_as::<_, AuditLogEntry>(
            "INSERT INTO audit_logs \
                (id, actor_id, action, target_type, target_id, metadata, ip_address, user_agent) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(entry.actor_id)
        .bind(entry.action.as_str())
        .bind(entry.action.target_type())
        .bind(entry.target_id)
        .bind(&entry.metadata)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to write audit log"))
    }

    async fn search(
        &self,
        filter: &AuditFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<AuditLogEntry>, u64)> {
        let count_sql = format!("SELECT COUNT(*) FROM audit_logs {FILTER_CLAUSE}");
        let select_sql = format!(
            "SELECT * FROM audit_logs {FILTER_CLAUSE} ORDER BY created_at DESC LIMIT $6 OFFSET $7"
        );

        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(&filter.action)
            .bind(filter.actor_id)
            .bind(&filter.target_type)
            .bind(filter.from)
            .bind(filter.to)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("Failed to count audit logs"))?;

        let entries = sqlx::query_as::<_, AuditLogEntry>(&select_sql)
        .bind(&filter.action)
        .bind(filter.actor_id)
        .bind(&filter.target_type)
        .bind(filter.from)
        .bind(filter.to)
        .bind(page.limit as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to query audit logs"))?;

        Ok((entries, total as u64))
    }
}
