//! `AuthUser` extractor: pulls the bearer JWT, verifies it and builds the request context.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

use workgrid_core::error::AppError;
use workgrid_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Extracted authenticated user context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts, state).await?;
        let claims = state.session_manager.decoder().decode_access_token(&token)?;

        // Admin tokens die with their session.
        if let Some(sid) = claims.sid {
            state.session_manager.validate_admin_session(sid).await?;
        }

        let ip_address = client_ip(&parts.headers);
        let user_agent = parts
            .headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        Ok(AuthUser(RequestContext::from_claims(claims, ip_address, user_agent)))
    }
}

/// The raw temp token presented to `POST /auth/admin/select-role`.
///
/// Only the bearer value is extracted here; the session manager verifies it.
#[derive(Debug, Clone)]
pub struct RoleSelectionToken(pub String);

impl FromRequestParts<AppState> for RoleSelectionToken {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(RoleSelectionToken(bearer_token(parts, state).await?))
    }
}

async fn bearer_token(parts: &mut Parts, state: &AppState) -> Result<String, ApiError> {
    let TypedHeader(Authorization(bearer)) =
        TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::unauthorized("Missing or malformed Authorization header"))?;
    Ok(bearer.token().to_string())
}

/// First hop of `X-Forwarded-For`, if present.
pub(crate) fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
