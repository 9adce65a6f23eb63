//! Role CRUD and role-permission links.

use axum::extract::State;
use uuid::Uuid;

use workgrid_core::types::pagination::PageResponse;
use workgrid_database::RoleFilter;
use workgrid_entity::role::{Permission, Role};
use workgrid_service::role::RoleDetail;

use crate::dto::request::{CreateRoleRequest, PermissionIdsRequest, UpdateRoleRequest};
use crate::dto::response::{ApiResponse, CountResponse};
use crate::error::ApiResult;
use crate::extractors::{ApiPath, ApiQuery, AuthUser, PaginationParams, ValidatedJson};
use crate::state::AppState;

/// GET /roles
pub async fn list_roles(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(filter): ApiQuery<RoleFilter>,
    ApiQuery(page): ApiQuery<PaginationParams>,
) -> ApiResult<ApiResponse<PageResponse<Role>>> {
    let roles = state
        .role_service
        .list_roles(&auth, filter, page.into_page_request())
        .await?;
    Ok(ApiResponse::ok(roles))
}

/// POST /roles
pub async fn create_role(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateRoleRequest>,
) -> ApiResult<ApiResponse<Role>> {
    let role = state.role_service.create_role(&auth, req.into()).await?;
    Ok(ApiResponse::created(role, "Role created"))
}

/// GET /roles/{id}
pub async fn get_role(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<RoleDetail>> {
    Ok(ApiResponse::ok(state.role_service.get_role(&auth, id).await?))
}

/// PATCH /roles/{id}
pub async fn update_role(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateRoleRequest>,
) -> ApiResult<ApiResponse<Role>> {
    let role = state.role_service.update_role(&auth, id, req.into()).await?;
    Ok(ApiResponse::ok_with_message(role, "Role updated"))
}

/// DELETE /roles/{id}
pub async fn delete_role(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<()>> {
    state.role_service.delete_role(&auth, id).await?;
    Ok(ApiResponse::message("Role deleted"))
}

/// GET /roles/{id}/permissions
pub async fn role_permissions(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<Vec<Permission>>> {
    Ok(ApiResponse::ok(
        state.role_service.role_permissions(&auth, id).await?,
    ))
}

/// POST /roles/{id}/permissions
pub async fn assign_permissions(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<PermissionIdsRequest>,
) -> ApiResult<ApiResponse<CountResponse>> {
    let count = state
        .role_service
        .assign_permissions(&auth, id, req.permission_ids)
        .await?;
    Ok(ApiResponse::ok_with_message(
        CountResponse { count },
        format!("{count} permission(s) assigned"),
    ))
}

/// DELETE /roles/{id}/permissions
pub async fn revoke_permissions(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<PermissionIdsRequest>,
) -> ApiResult<ApiResponse<CountResponse>> {
    let count = state
        .role_service
        .revoke_permissions(&auth, id, req.permission_ids)
        .await?;
    Ok(ApiResponse::ok_with_message(
        CountResponse { count },
        format!("{count} permission(s) revoked"),
    ))
}
