use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use workgrid_core::result::AppResult;
use workgrid_core::types::pagination::PageRequest;
use workgrid_entity::audit::{AuditFilter, AuditLogEntry, CreateAuditLogEntry};

use super::{MemoryStore, paginate};
use crate::store::AuditStore;

#[async_trait]
impl AuditStore for MemoryStore {
    async fn append(&self, entry: CreateAuditLogEntry) -> AppResult<AuditLogEntry> {
        let mut state = self.state.write().await;
        let created = AuditLogEntry {
            id: Uuid::new_v4(),
            actor_id: entry.actor_id,
            action: entry.action.as_str().to_string(),
            target_type: entry.action.target_type().to_string(),
            target_id: entry.target_id,
            metadata: entry.metadata,
            ip_address: entry.ip_address,
            user_agent: entry.user_agent,
            created_at: Utc::now(),
        };
        state.audit_logs.push(created.clone());
        Ok(created)
    }

    async fn search(
        &self,
        filter: &AuditFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<AuditLogEntry>, u64)> {
        let state = self.state.read().await;
        // Appended in time order, so reversing yields newest first.
        let matching: Vec<AuditLogEntry> = state
            .audit_logs
            .iter()
            .rev()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        Ok(paginate(matching, page))
    }
}
