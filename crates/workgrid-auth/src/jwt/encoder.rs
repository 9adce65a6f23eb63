//! JWT token creation with configurable signing and TTL.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::Serialize;
use uuid::Uuid;

use workgrid_core::config::AuthConfig;
use workgrid_core::error::AppError;
use workgrid_entity::user::UserType;

use super::claims::{
    AccessClaims, ROLE_SELECTION_PURPOSE, RefreshClaims, RoleSelectionClaims, TokenType,
};
use crate::rbac::ResolvedAccess;

/// Creates signed JWT access, refresh and role-selection tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    temp_ttl: Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("temp_ttl", &self.temp_ttl)
            .finish()
    }
}

/// Access + refresh token pair returned to clients.
#[derive(Debug, Clone, Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

/// A freshly minted pair plus what must be persisted about the refresh token.
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub pair: TokenPair,
    /// `jti` of the refresh token, used as its record id.
    pub refresh_id: Uuid,
    pub family_id: Uuid,
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl: Duration::minutes(config.jwt_access_ttl_minutes as i64),
            refresh_ttl: Duration::hours(config.jwt_refresh_ttl_hours as i64),
            temp_ttl: Duration::minutes(config.temp_token_ttl_minutes as i64),
        }
    }

    /// Mints an access + refresh pair. The refresh token joins `family_id`.
    pub fn issue_pair(
        &self,
        user_id: Uuid,
        user_type: UserType,
        access: &ResolvedAccess,
        family_id: Uuid,
        session_id: Option<Uuid>,
    ) -> Result<IssuedTokens, AppError> {
        let now = Utc::now();
        let access_exp = now + self.access_ttl;
        let refresh_exp = now + self.refresh_ttl;
        let refresh_id = Uuid::new_v4();

        let access_claims = AccessClaims {
            sub: user_id,
            user_type,
            roles: access.roles.clone(),
            permissions: access.permissions.clone(),
            tenant_id: access.tenant_id,
            jti: Uuid::new_v4(),
            sid: session_id,
            iat: now.timestamp(),
            exp: access_exp.timestamp(),
            typ: TokenType::Access,
        };

        let refresh_claims = RefreshClaims {
            sub: user_id,
            fam: family_id,
            jti: refresh_id,
            sid: session_id,
            iat: now.timestamp(),
            exp: refresh_exp.timestamp(),
            typ: TokenType::Refresh,
        };

        let access_token = encode(&Header::default(), &access_claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))?;

        let refresh_token = encode(&Header::default(), &refresh_claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode refresh token: {e}")))?;

        Ok(IssuedTokens {
            pair: TokenPair {
                access_token,
                refresh_token,
                access_expires_at: access_exp,
                refresh_expires_at: refresh_exp,
            },
            refresh_id,
            family_id,
        })
    }

    /// Mints a role-selection temp token for a multi-role admin.
    pub fn issue_role_selection(
        &self,
        user_id: Uuid,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let now = Utc::now();
        let exp = now + self.temp_ttl;

        let claims = RoleSelectionClaims {
            sub: user_id,
            purpose: ROLE_SELECTION_PURPOSE.to_string(),
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            typ: TokenType::RoleSelection,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode temp token: {e}")))?;

        Ok((token, exp))
    }
}
