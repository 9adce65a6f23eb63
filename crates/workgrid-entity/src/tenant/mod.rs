//! Tenant (client organization) entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A client organization. Created together with the CLIENT user that signs up.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    /// Unique tenant identifier.
    pub id: Uuid,
    /// Registered company name.
    pub company_name: String,
    /// When the tenant was created.
    pub created_at: DateTime<Utc>,
}
