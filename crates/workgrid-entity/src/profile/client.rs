//! Client profile entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Profile of a CLIENT user, tying them to their tenant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfile {
    /// Owning user.
    pub user_id: Uuid,
    /// Tenant the client belongs to.
    pub tenant_id: Uuid,
    /// Contact name.
    pub full_name: Option<String>,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
}
