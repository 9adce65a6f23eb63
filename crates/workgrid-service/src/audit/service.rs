//! Append-only audit log service.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use workgrid_auth::rbac::catalog;
use workgrid_core::result::AppResult;
use workgrid_core::types::pagination::{PageRequest, PageResponse};
use workgrid_database::AuditStore;
use workgrid_entity::audit::{AuditAction, AuditFilter, AuditLogEntry, CreateAuditLogEntry};

use crate::context::RequestContext;

/// Records administrative actions and serves the audit log.
#[derive(Debug, Clone)]
pub struct AuditService {
    /// Audit store.
    store: Arc<dyn AuditStore>,
}

impl AuditService {
    /// Creates a new audit service.
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Appends an entry attributed to the acting user, or to the system when
    /// `ctx` is `None`.
    pub async fn record(
        &self,
        ctx: Option<&RequestContext>,
        action: AuditAction,
        target_id: Option<Uuid>,
        metadata: serde_json::Value,
    ) -> AppResult<AuditLogEntry> {
        let entry = self
            .store
            .append(CreateAuditLogEntry {
                actor_id: ctx.map(|c| c.user_id),
                action,
                target_id,
                metadata,
                ip_address: ctx.and_then(|c| c.ip_address.clone()),
                user_agent: ctx.and_then(|c| c.user_agent.clone()),
            })
            .await?;

        debug!(action = %action, target_id = ?target_id, "Audit entry recorded");
        Ok(entry)
    }

    /// Searches the audit log, newest first.
    pub async fn search(
        &self,
        ctx: &RequestContext,
        filter: AuditFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        ctx.require(catalog::AUDIT_READ)?;

        let page = page.normalized();
        let (items, total) = self.store.search(&filter, page).await?;
        Ok(PageResponse::new(items, page, total))
    }
}
