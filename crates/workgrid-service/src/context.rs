//! Request context carrying the authenticated principal and its permissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use workgrid_auth::jwt::AccessClaims;
use workgrid_auth::rbac;
use workgrid_auth::session::ClientInfo;
use workgrid_core::result::AppResult;
use workgrid_entity::user::UserType;

/// Context for the current authenticated request.
///
/// Built from a verified access token and passed into service methods so
/// that every operation knows who is acting and what they may do.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    pub user_type: UserType,
    /// Role names carried by the token.
    pub roles: Vec<String>,
    /// Permission names carried by the token.
    pub permissions: Vec<String>,
    pub tenant_id: Option<Uuid>,
    /// Admin session, for admin tokens.
    pub session_id: Option<Uuid>,
    /// IP address of the request origin.
    pub ip_address: Option<String>,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context from verified access-token claims.
    pub fn from_claims(
        claims: AccessClaims,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            user_id: claims.sub,
            user_type: claims.user_type,
            roles: claims.roles,
            permissions: claims.permissions,
            tenant_id: claims.tenant_id,
            session_id: claims.sid,
            ip_address,
            user_agent,
            request_time: Utc::now(),
        }
    }

    /// Fails with `Forbidden` unless `permission` was granted.
    pub fn require(&self, permission: &str) -> AppResult<()> {
        rbac::require_permission(&self.permissions, permission)
    }

    /// Fails with `Forbidden` unless one of `permissions` was granted.
    pub fn require_any(&self, permissions: &[&str]) -> AppResult<()> {
        rbac::require_any_permission(&self.permissions, permissions)
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    /// Origin details in the form the session manager records.
    pub fn client_info(&self) -> ClientInfo {
        ClientInfo {
            ip_address: self.ip_address.clone(),
            user_agent: self.user_agent.clone(),
        }
    }
}
