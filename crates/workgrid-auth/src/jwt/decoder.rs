//! JWT token validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::de::DeserializeOwned;

use workgrid_core::config::AuthConfig;
use workgrid_core::error::AppError;

use super::claims::{
    AccessClaims, ROLE_SELECTION_PURPOSE, RefreshClaims, RoleSelectionClaims, TokenType,
};

/// Validates signature, expiry and kind of incoming tokens.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5; // seconds of clock skew
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates an access token string.
    pub fn decode_access_token(&self, token: &str) -> Result<AccessClaims, AppError> {
        let claims: AccessClaims = self.decode_token(token)?;
        if claims.typ != TokenType::Access {
            return Err(AppError::unauthorized(
                "Invalid token type: expected access token",
            ));
        }
        Ok(claims)
    }

    /// Decodes and validates a refresh token string.
    pub fn decode_refresh_token(&self, token: &str) -> Result<RefreshClaims, AppError> {
        let claims: RefreshClaims = self.decode_token(token)?;
        if claims.typ != TokenType::Refresh {
            return Err(AppError::unauthorized(
                "Invalid token type: expected refresh token",
            ));
        }
        Ok(claims)
    }

    /// Decodes a role-selection temp token and checks its purpose.
    pub fn decode_role_selection_token(
        &self,
        token: &str,
    ) -> Result<RoleSelectionClaims, AppError> {
        let claims: RoleSelectionClaims = self.decode_token(token)?;
        if claims.typ != TokenType::RoleSelection || claims.purpose != ROLE_SELECTION_PURPOSE {
            return Err(AppError::unauthorized(
                "Invalid token type: expected role selection token",
            ));
        }
        Ok(claims)
    }

    fn decode_token<T: DeserializeOwned>(&self, token: &str) -> Result<T, AppError> {
        let token_data = decode::<T>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::unauthorized("Token has expired")
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::unauthorized("Invalid token signature")
                }
                jsonwebtoken::errors::ErrorKind::Json(_)
                | jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(_) => {
                    AppError::unauthorized("Invalid token type")
                }
                _ => AppError::unauthorized("Invalid token"),
            }
        })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use workgrid_entity::user::UserType;

    use super::*;
    use crate::jwt::JwtEncoder;
    use crate::rbac::ResolvedAccess;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "unit-test-secret-0123456789".into(),
            ..AuthConfig::default()
        }
    }

    fn access() -> ResolvedAccess {
        ResolvedAccess {
            roles: vec!["SP_BASIC".into()],
            permissions: vec!["jobs:accept".into(), "jobs:read".into()],
            tenant_id: None,
        }
    }

    #[test]
    fn test_pair_round_trip() {
        let encoder = JwtEncoder::new(&config());
        let decoder = JwtDecoder::new(&config());
        let user_id = Uuid::new_v4();
        let family = Uuid::new_v4();

        let issued = encoder
            .issue_pair(user_id, UserType::Sp, &access(), family, None)
            .unwrap();

        let claims = decoder.decode_access_token(&issued.pair.access_token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.roles, vec!["SP_BASIC"]);
        assert!(claims.has_permission("jobs:accept"));

        let refresh = decoder.decode_refresh_token(&issued.pair.refresh_token).unwrap();
        assert_eq!(refresh.fam, family);
        assert_eq!(refresh.jti, issued.refresh_id);
    }

    #[test]
    fn test_token_kinds_are_not_interchangeable() {
        let encoder = JwtEncoder::new(&config());
        let decoder = JwtDecoder::new(&config());
        let issued = encoder
            .issue_pair(Uuid::new_v4(), UserType::Sp, &access(), Uuid::new_v4(), None)
            .unwrap();
        let (temp, _) = encoder.issue_role_selection(Uuid::new_v4()).unwrap();

        assert!(decoder.decode_refresh_token(&issued.pair.access_token).is_err());
        assert!(decoder.decode_access_token(&issued.pair.refresh_token).is_err());
        assert!(decoder.decode_access_token(&temp).is_err());
        assert!(decoder.decode_role_selection_token(&issued.pair.access_token).is_err());
        assert!(decoder.decode_role_selection_token(&temp).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let encoder = JwtEncoder::new(&config());
        let other = JwtDecoder::new(&AuthConfig {
            jwt_secret: "a-completely-different-secret".into(),
            ..AuthConfig::default()
        });
        let issued = encoder
            .issue_pair(Uuid::new_v4(), UserType::Sp, &access(), Uuid::new_v4(), None)
            .unwrap();
        let err = other.decode_access_token(&issued.pair.access_token).unwrap_err();
        assert_eq!(err.kind, workgrid_core::error::ErrorKind::Unauthorized);
    }
}
