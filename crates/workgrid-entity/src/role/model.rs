//! Role entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::user::UserType;

/// A named bundle of permissions that a user of `actor_type` may hold.
///
/// `parent_id` records a single-parent hierarchy for display purposes only;
/// permissions are never inherited through it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: Uuid,
    /// Unique UPPER_SNAKE name, e.g. `CLIENT_ADMIN`.
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    /// The only user type allowed to hold this role.
    pub actor_type: UserType,
    /// System roles are seeded and cannot be deleted.
    pub is_system: bool,
    pub is_active: bool,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Compact projection used in login responses and token candidates.
    pub fn summary(&self) -> RoleSummary {
        RoleSummary {
            id: self.id,
            name: self.name.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

/// `{id, name, displayName}` projection of a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSummary {
    pub id: Uuid,
    pub name: String,
    pub display_name: String,
}

/// Data required to create a role.
#[derive(Debug, Clone)]
pub struct CreateRole {
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub actor_type: UserType,
    pub is_system: bool,
    pub parent_id: Option<Uuid>,
}

/// Partial role update. `parent_id: Some(None)` clears the parent.
#[derive(Debug, Clone, Default)]
pub struct UpdateRole {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub parent_id: Option<Option<Uuid>>,
}

/// Check that `name` is UPPER_SNAKE: starts with a letter, then `A-Z`, `0-9`, `_`.
pub fn is_valid_role_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() => {}
        _ => return false,
    }
    name.len() <= 64
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        && !name.ends_with('_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_name_rules() {
        assert!(is_valid_role_name("CLIENT_ADMIN"));
        assert!(is_valid_role_name("SP_LEVEL2"));
        assert!(!is_valid_role_name("client_admin"));
        assert!(!is_valid_role_name("_ADMIN"));
        assert!(!is_valid_role_name("ADMIN_"));
        assert!(!is_valid_role_name("SUPER-ADMIN"));
        assert!(!is_valid_role_name(""));
    }
}
