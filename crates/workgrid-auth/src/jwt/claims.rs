//! Claims carried by the three token kinds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use workgrid_entity::user::UserType;

/// `purpose` value of a role-selection token.
pub const ROLE_SELECTION_PURPOSE: &str = "role_selection";

/// Distinguishes the token kinds signed with the same key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived token for API requests.
    Access,
    /// Long-lived token exchanged for a new pair.
    Refresh,
    /// Bridges login and role pick for multi-role admins.
    RoleSelection,
}

/// Payload of an access token:
/// `{sub, userType, roles[], permissions[], tenantId|null, jti, ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    /// Subject: the user ID.
    pub sub: Uuid,
    pub user_type: UserType,
    /// Role names in effect for this token.
    pub roles: Vec<String>,
    /// Permission names resolved from `roles`.
    pub permissions: Vec<String>,
    /// Tenant scope, `null` for unscoped principals.
    pub tenant_id: Option<Uuid>,
    /// JWT ID.
    pub jti: Uuid,
    /// Admin session this token belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<Uuid>,
    pub iat: i64,
    pub exp: i64,
    pub typ: TokenType,
}

/// Payload of a refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject: the user ID.
    pub sub: Uuid,
    /// Rotation family.
    pub fam: Uuid,
    /// JWT ID; doubles as the stored token record id.
    pub jti: Uuid,
    /// Admin session carried across rotations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<Uuid>,
    pub iat: i64,
    pub exp: i64,
    pub typ: TokenType,
}

/// Payload of a role-selection temp token. Carries no roles or permissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleSelectionClaims {
    /// Subject: the admin's user ID.
    pub sub: Uuid,
    /// Always [`ROLE_SELECTION_PURPOSE`].
    pub purpose: String,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
    pub typ: TokenType,
}

impl AccessClaims {
    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }

    /// Whether `permission` was granted.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_claims_wire_shape() {
        let claims = AccessClaims {
            sub: Uuid::new_v4(),
            user_type: UserType::Client,
            roles: vec!["CLIENT_ADMIN".into()],
            permissions: vec!["jobs:read".into()],
            tenant_id: None,
            jti: Uuid::new_v4(),
            sid: None,
            iat: 0,
            exp: 60,
            typ: TokenType::Access,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["userType"], "CLIENT");
        assert!(json["tenantId"].is_null());
        assert!(json.get("sid").is_none());
        assert_eq!(json["typ"], "access");
    }
}
