//! Join entities: role↔permission and user↔role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::model::Role;

/// A permission granted to a role. `(role_id, permission_id)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RolePermission {
    pub role_id: Uuid,
    pub permission_id: Uuid,
    pub granted_by_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A role held by a user, optionally scoped to a tenant and optionally expiring.
///
/// `(user_id, role_id, tenant_id)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserRole {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub assigned_by_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl UserRole {
    /// Active and not yet expired at `now`.
    pub fn is_effective_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at.is_none_or(|exp| exp > now)
    }
}

/// Data required to assign a role to a user.
#[derive(Debug, Clone)]
pub struct AssignUserRole {
    pub user_id: Uuid,
    pub role_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub expires_at: Option<DateTime<Utc>>,
    pub assigned_by_id: Option<Uuid>,
}

/// A user-role assignment joined with the role's names, for listings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserRoleView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub assignment: UserRole,
    pub role_name: String,
    pub role_display_name: String,
}

/// An effective role of a user together with the scope it was granted in.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ActiveRole {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub role: Role,
    /// Tenant the assignment is scoped to.
    pub tenant_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn assignment(is_active: bool, expires_at: Option<DateTime<Utc>>) -> UserRole {
        UserRole {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            role_id: Uuid::new_v4(),
            tenant_id: None,
            is_active,
            expires_at,
            assigned_by_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_effective_window() {
        let now = Utc::now();
        assert!(assignment(true, None).is_effective_at(now));
        assert!(assignment(true, Some(now + Duration::hours(1))).is_effective_at(now));
        assert!(!assignment(true, Some(now - Duration::seconds(1))).is_effective_at(now));
        assert!(!assignment(false, None).is_effective_at(now));
    }
}
