//! Auth handlers: signup, login, role selection, refresh, logout, me.

use axum::extract::State;
use axum::http::HeaderMap;

use workgrid_auth::{ClientInfo, LogoutReport};
use workgrid_service::auth::{AuthResult, LoginResult, UserDetail};

use crate::dto::request::{LoginRequest, RefreshRequest, SelectRoleRequest, SignupRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::auth::client_ip;
use crate::extractors::{AuthUser, RoleSelectionToken, ValidatedJson};
use crate::state::AppState;

fn client_info(headers: &HeaderMap) -> ClientInfo {
    ClientInfo {
        ip_address: client_ip(headers),
        user_agent: headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .map(String::from),
    }
}

/// POST /auth/signup
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SignupRequest>,
) -> ApiResult<ApiResponse<AuthResult>> {
    let result = state.auth_service.signup(req.into()).await?;
    Ok(ApiResponse::created(result, "Account created"))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<ApiResponse<LoginResult>> {
    let result = state
        .auth_service
        .login(&req.phone, &req.password, client_info(&headers))
        .await?;
    let message = match &result {
        LoginResult::Authenticated(_) => "Login successful",
        LoginResult::RoleSelectionRequired(_) => "Select a role to continue",
    };
    Ok(ApiResponse::ok_with_message(result, message))
}

/// POST /auth/admin/select-role
pub async fn select_role(
    State(state): State<AppState>,
    RoleSelectionToken(temp_token): RoleSelectionToken,
    headers: HeaderMap,
    ValidatedJson(req): ValidatedJson<SelectRoleRequest>,
) -> ApiResult<ApiResponse<AuthResult>> {
    let result = state
        .auth_service
        .select_role(&temp_token, req.role_id, client_info(&headers))
        .await?;
    Ok(ApiResponse::ok_with_message(result, "Login successful"))
}

/// POST /auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> ApiResult<ApiResponse<AuthResult>> {
    let result = state.auth_service.refresh(&req.refresh_token).await?;
    Ok(ApiResponse::ok_with_message(result, "Token refreshed"))
}

/// POST /auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiResponse<LogoutReport>> {
    let report = state.auth_service.logout(&auth).await?;
    Ok(ApiResponse::ok_with_message(report, "Logged out"))
}

/// GET /auth/me
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<ApiResponse<UserDetail>> {
    Ok(ApiResponse::ok(state.auth_service.me(&auth).await?))
}
