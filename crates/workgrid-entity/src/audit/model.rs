//! Audit log entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::action::AuditAction;

/// An immutable audit log entry recording an administrative action.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    /// Unique audit entry identifier.
    pub id: Uuid,
    /// The user who performed the action (`None` for system actions).
    pub actor_id: Option<Uuid>,
    /// The action that was performed (e.g., `"role.delete"`).
    pub action: String,
    /// The type of target resource (e.g., `"role"`, `"user"`).
    pub target_type: String,
    /// The target resource ID (if applicable).
    pub target_id: Option<Uuid>,
    /// Additional details about the action.
    pub metadata: serde_json::Value,
    /// IP address of the actor.
    pub ip_address: Option<String>,
    /// User-Agent of the actor.
    pub user_agent: Option<String>,
    /// When the action occurred.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new audit log entry.
#[derive(Debug, Clone)]
pub struct CreateAuditLogEntry {
    pub actor_id: Option<Uuid>,
    pub action: AuditAction,
    pub target_id: Option<Uuid>,
    pub metadata: serde_json::Value,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Optional filters for querying the audit trail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFilter {
    /// Exact action name.
    pub action: Option<String>,
    /// Only entries by this actor.
    pub actor_id: Option<Uuid>,
    /// Only entries for this target type.
    pub target_type: Option<String>,
    /// Inclusive lower bound on `created_at`.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub to: Option<DateTime<Utc>>,
}

impl AuditFilter {
    /// Whether `entry` passes every filter that is set.
    pub fn matches(&self, entry: &AuditLogEntry) -> bool {
        self.action.as_deref().is_none_or(|a| entry.action == a)
            && self.actor_id.is_none_or(|id| entry.actor_id == Some(id))
            && self
                .target_type
                .as_deref()
                .is_none_or(|t| entry.target_type == t)
            && self.from.is_none_or(|from| entry.created_at >= from)
            && self.to.is_none_or(|to| entry.created_at <= to)
    }
}
