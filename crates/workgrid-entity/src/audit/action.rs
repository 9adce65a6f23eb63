//! Audited action names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Actions recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditAction {
    #[serde(rename = "role.create")]
    RoleCreate,
    #[serde(rename = "role.update")]
    RoleUpdate,
    #[serde(rename = "role.delete")]
    RoleDelete,
    #[serde(rename = "role.permissions.assign")]
    RolePermissionsAssign,
    #[serde(rename = "role.permissions.revoke")]
    RolePermissionsRevoke,
    #[serde(rename = "permission.create")]
    PermissionCreate,
    #[serde(rename = "permission.update")]
    PermissionUpdate,
    #[serde(rename = "permission.delete")]
    PermissionDelete,
    #[serde(rename = "user.create")]
    UserCreate,
    #[serde(rename = "user.delete")]
    UserDelete,
    #[serde(rename = "user.role.assign")]
    UserRoleAssign,
    #[serde(rename = "user.role.revoke")]
    UserRoleRevoke,
}

impl AuditAction {
    /// Dotted action name as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoleCreate => "role.create",
            Self::RoleUpdate => "role.update",
            Self::RoleDelete => "role.delete",
            Self::RolePermissionsAssign => "role.permissions.assign",
            Self::RolePermissionsRevoke => "role.permissions.revoke",
            Self::PermissionCreate => "permission.create",
            Self::PermissionUpdate => "permission.update",
            Self::PermissionDelete => "permission.delete",
            Self::UserCreate => "user.create",
            Self::UserDelete => "user.delete",
            Self::UserRoleAssign => "user.role.assign",
            Self::UserRoleRevoke => "user.role.revoke",
        }
    }

    /// Type of the entity the action targets.
    pub fn target_type(&self) -> &'static str {
        match self {
            Self::RoleCreate
            | Self::RoleUpdate
            | Self::RoleDelete
            | Self::RolePermissionsAssign
            | Self::RolePermissionsRevoke => "role",
            Self::PermissionCreate | Self::PermissionUpdate | Self::PermissionDelete => {
                "permission"
            }
            Self::UserCreate | Self::UserDelete | Self::UserRoleAssign | Self::UserRoleRevoke => {
                "user"
            }
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
