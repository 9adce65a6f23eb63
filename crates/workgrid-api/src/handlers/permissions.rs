//! Permission catalog handlers.

use axum::extract::State;
use serde::Deserialize;
use uuid::Uuid;

use workgrid_core::types::pagination::PageResponse;
use workgrid_entity::role::{Permission, PermissionGroup};

use crate::dto::request::{CreateGroupRequest, CreatePermissionRequest, UpdatePermissionRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{ApiPath, ApiQuery, AuthUser, PaginationParams, ValidatedJson};
use crate::state::AppState;

/// `?groupId=` filter for the permission list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionQuery {
    pub group_id: Option<Uuid>,
}

/// GET /permissions
pub async fn list_permissions(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<PermissionQuery>,
    ApiQuery(page): ApiQuery<PaginationParams>,
) -> ApiResult<ApiResponse<PageResponse<Permission>>> {
    let permissions = state
        .permission_service
        .list_permissions(&auth, query.group_id, page.into_page_request())
        .await?;
    Ok(ApiResponse::ok(permissions))
}

/// POST /permissions
pub async fn create_permission(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreatePermissionRequest>,
) -> ApiResult<ApiResponse<Permission>> {
    let permission = state
        .permission_service
        .create_permission(&auth, req.into())
        .await?;
    Ok(ApiResponse::created(permission, "Permission created"))
}

/// GET /permissions/{id}
pub async fn get_permission(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<Permission>> {
    Ok(ApiResponse::ok(
        state.permission_service.get_permission(&auth, id).await?,
    ))
}

/// PATCH /permissions/{id}
pub async fn update_permission(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdatePermissionRequest>,
) -> ApiResult<ApiResponse<Permission>> {
    let permission = state
        .permission_service
        .update_permission(&auth, id, req.into())
        .await?;
    Ok(ApiResponse::ok_with_message(permission, "Permission updated"))
}

/// DELETE /permissions/{id}
pub async fn delete_permission(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<ApiResponse<()>> {
    state.permission_service.delete_permission(&auth, id).await?;
    Ok(ApiResponse::message("Permission deleted"))
}

/// GET /permissions/groups
pub async fn list_groups(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiResponse<Vec<PermissionGroup>>> {
    Ok(ApiResponse::ok(
        state.permission_service.list_groups(&auth).await?,
    ))
}

/// POST /permissions/groups
pub async fn create_group(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateGroupRequest>,
) -> ApiResult<ApiResponse<PermissionGroup>> {
    let group = state
        .permission_service
        .create_group(&auth, req.into())
        .await?;
    Ok(ApiResponse::created(group, "Permission group created"))
}
