//! Admin profile entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Profile of an ADMIN user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    /// Owning user.
    pub user_id: Uuid,
    /// Display name.
    pub full_name: Option<String>,
    /// Role selected for the current admin session.
    pub active_role_id: Option<Uuid>,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
}
