//! Permission and permission group entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A single capability, named `namespace:action` (e.g. `roles:write`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub group_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A display category for permissions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PermissionGroup {
    pub id: Uuid,
    /// Unique machine name, e.g. `roles`.
    pub name: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

/// Data required to create a permission.
#[derive(Debug, Clone)]
pub struct CreatePermission {
    pub name: String,
    pub description: Option<String>,
    pub group_id: Option<Uuid>,
}

/// Partial permission update. `group_id: Some(None)` ungroups the permission.
#[derive(Debug, Clone, Default)]
pub struct UpdatePermission {
    pub description: Option<String>,
    pub group_id: Option<Option<Uuid>>,
}

/// Data required to create a permission group.
#[derive(Debug, Clone)]
pub struct CreatePermissionGroup {
    pub name: String,
    pub display_name: String,
}

/// Check that `name` has the shape `namespace:action`, both parts built from
/// lowercase letters, digits, `_`, `-` and `.`.
pub fn is_valid_permission_name(name: &str) -> bool {
    let valid_part = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.'))
    };
    match name.split_once(':') {
        Some((namespace, action)) => {
            name.len() <= 128 && valid_part(namespace) && valid_part(action)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_name_rules() {
        assert!(is_valid_permission_name("roles:write"));
        assert!(is_valid_permission_name("jobs:assign-sp"));
        assert!(!is_valid_permission_name("roles"));
        assert!(!is_valid_permission_name("Roles:write"));
        assert!(!is_valid_permission_name("roles:"));
        assert!(!is_valid_permission_name("roles:write:all"));
    }
}
