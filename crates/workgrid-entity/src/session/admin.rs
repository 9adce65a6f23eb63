//! Admin session entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An admin login session bound to the role the admin is acting as.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role_id: Uuid,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub terminated_at: Option<DateTime<Utc>>,
    pub terminated_reason: Option<String>,
}

impl AdminSession {
    /// Whether the session has not been terminated.
    pub fn is_active(&self) -> bool {
        self.terminated_at.is_none()
    }
}

/// Data required to open an admin session.
#[derive(Debug, Clone)]
pub struct CreateAdminSession {
    pub user_id: Uuid,
    pub role_id: Uuid,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}
