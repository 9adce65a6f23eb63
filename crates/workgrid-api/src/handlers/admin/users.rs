//! Admin user management.

use axum::extract::State;
use serde::Deserialize;
use uuid::Uuid;

use workgrid_core::types::pagination::PageResponse;
use workgrid_database::UserFilter;
use workgrid_entity::role::{UserRole, UserRoleView};
use workgrid_entity::user::User;
use workgrid_service::user::AdminUserView;

use crate::dto::request::{AssignRoleRequest, CreateUserRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{ApiPath, ApiQuery, AuthUser, PaginationParams, ValidatedJson};
use crate::state::AppState;

/// `?tenantId=` narrowing a role revocation to one scope.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeRoleQuery {
    pub tenant_id: Option<Uuid>,
}

/// GET /admin/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(filter): ApiQuery<UserFilter>,
    ApiQuery(page): ApiQuery<PaginationParams>,
) -> ApiResult<ApiResponse<PageResponse<User>>> {
    let users = state
        .admin_user_service
        .list_users(&auth, filter, page.into_page_request())
        .await?;
    Ok(ApiResponse::ok(users))
}

/// POST /admin/users
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> ApiResult<ApiResponse<User>> {
    let (new_user, role_ids) = req.into_parts();
    let user = state
        .admin_user_service
        .create_user(&auth, new_user, role_ids)
        .await?;
    Ok(ApiResponse::created(user, "User created"))
}

/// GET /admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<AdminUserView>> {
    Ok(ApiResponse::ok(
        state.admin_user_service.get_user(&auth, id).await?,
    ))
}

/// DELETE /admin/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<()>> {
    state.admin_user_service.delete_user(&auth, id).await?;
    Ok(ApiResponse::message("User deleted"))
}

/// GET /admin/users/{id}/roles
pub async fn list_user_roles(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<Vec<UserRoleView>>> {
    Ok(ApiResponse::ok(
        state.admin_user_service.list_user_roles(&auth, id).await?,
    ))
}

/// POST /admin/users/{id}/roles
pub async fn assign_role(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<AssignRoleRequest>,
) -> ApiResult<ApiResponse<UserRole>> {
    let assignment = state
        .admin_user_service
        .assign_role(&auth, id, req.into())
        .await?;
    Ok(ApiResponse::created(assignment, "Role assigned"))
}

/// DELETE /admin/users/{id}/roles/{roleId}
pub async fn revoke_role(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath((id, role_id)): ApiPath<(Uuid, Uuid)>,
    ApiQuery(query): ApiQuery<RevokeRoleQuery>,
) -> ApiResult<ApiResponse<()>> {
    state
        .admin_user_service
        .revoke_role(&auth, id, role_id, query.tenant_id)
        .await?;
    Ok(ApiResponse::message("Role revoked"))
}
