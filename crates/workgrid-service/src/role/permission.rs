//! Permission and permission group CRUD.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use workgrid_auth::rbac::catalog;
use workgrid_core::error::AppError;
use workgrid_core::result::AppResult;
use workgrid_core::types::pagination::{PageRequest, PageResponse};
use workgrid_database::Stores;
use workgrid_entity::audit::AuditAction;
use workgrid_entity::role::{
    CreatePermission, CreatePermissionGroup, Permission, PermissionGroup, UpdatePermission,
    is_valid_permission_name,
};

use crate::audit::AuditService;
use crate::context::RequestContext;

/// Input for creating a permission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePermissionRequest {
    pub name: String,
    pub description: Option<String>,
    pub group_id: Option<Uuid>,
}

/// Partial permission update. `group_id: Some(None)` ungroups it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePermissionRequest {
    pub description: Option<String>,
    pub group_id: Option<Option<Uuid>>,
}

/// Input for creating a permission group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePermissionGroupRequest {
    pub name: String,
    pub display_name: String,
}

/// Manages the permission catalog.
#[derive(Debug, Clone)]
pub struct PermissionService {
    stores: Stores,
    audit: AuditService,
}

impl PermissionService {
    /// Creates a new permission service.
    pub fn new(stores: Stores, audit: AuditService) -> Self {
        Self { stores, audit }
    }

    /// Lists permissions, optionally within one group.
    pub async fn list_permissions(
        &self,
        ctx: &RequestContext,
        group_id: Option<Uuid>,
        page: PageRequest,
    ) -> AppResult<PageResponse<Permission>> {
        ctx.require(catalog::PERMISSIONS_READ)?;
        let page = page.normalized();
        let (items, total) = self.stores.roles.list_permissions(group_id, page).await?;
        Ok(PageResponse::new(items, page, total))
    }

    /// Gets one permission.
    pub async fn get_permission(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Permission> {
        ctx.require(catalog::PERMISSIONS_READ)?;
        self.find(id).await
    }

    /// Creates a permission named `namespace:action`.
    pub async fn create_permission(
        &self,
        ctx: &RequestContext,
        req: CreatePermissionRequest,
    ) -> AppResult<Permission> {
        ctx.require(catalog::PERMISSIONS_WRITE)?;

        if !is_valid_permission_name(&req.name) {
            return Err(AppError::validation(
                "name: must look like namespace:action (lowercase)",
            ));
        }
        if let Some(group_id) = req.group_id {
            self.find_group_for(group_id).await?;
        }

        let permission = self
            .stores
            .roles
            .create_permission(CreatePermission {
                name: req.name,
                description: req.description,
                group_id: req.group_id,
            })
            .await?;

        self.audit
            .record(
                Some(ctx),
                AuditAction::PermissionCreate,
                Some(permission.id),
                json!({ "name": permission.name }),
            )
            .await?;

        info!(actor_id = %ctx.user_id, permission = %permission.name, "Permission created");
        Ok(permission)
    }

    /// Updates a permission's description or group.
    pub async fn update_permission(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        req: UpdatePermissionRequest,
    ) -> AppResult<Permission> {
        ctx.require(catalog::PERMISSIONS_WRITE)?;
        if let Some(Some(group_id)) = req.group_id {
            self.find_group_for(group_id).await?;
        }

        let permission = self
            .stores
            .roles
            .update_permission(
                id,
                UpdatePermission {
                    description: req.description,
                    group_id: req.group_id,
                },
            )
            .await?
            .ok_or_else(|| AppError::not_found("Permission not found"))?;

        self.audit
            .record(
                Some(ctx),
                AuditAction::PermissionUpdate,
                Some(permission.id),
                json!({ "name": permission.name, "groupId": permission.group_id }),
            )
            .await?;

        Ok(permission)
    }

    /// Deletes a permission and unlinks it from every role.
    pub async fn delete_permission(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        ctx.require(catalog::PERMISSIONS_WRITE)?;
        let permission = self.find(id).await?;

        if !self.stores.roles.delete_permission(id).await? {
            return Err(AppError::not_found("Permission not found"));
        }

        self.audit
            .record(
                Some(ctx),
                AuditAction::PermissionDelete,
                Some(id),
                json!({ "name": permission.name }),
            )
            .await?;

        info!(actor_id = %ctx.user_id, permission = %permission.name, "Permission deleted");
        Ok(())
    }

    /// Lists every permission group.
    pub async fn list_groups(&self, ctx: &RequestContext) -> AppResult<Vec<PermissionGroup>> {
        ctx.require(catalog::PERMISSIONS_READ)?;
        self.stores.roles.list_permission_groups().await
    }

    /// Creates a permission group.
    pub async fn create_group(
        &self,
        ctx: &RequestContext,
        req: CreatePermissionGroupRequest,
    ) -> AppResult<PermissionGroup> {
        ctx.require(catalog::PERMISSIONS_WRITE)?;

        let valid_name = !req.name.is_empty()
            && req
                .name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !valid_name {
            return Err(AppError::validation(
                "name: must be lowercase letters, digits and underscores",
            ));
        }

        let group = self
            .stores
            .roles
            .create_permission_group(CreatePermissionGroup {
                name: req.name,
                display_name: req.display_name,
            })
            .await?;

        info!(actor_id = %ctx.user_id, group = %group.name, "Permission group created");
        Ok(group)
    }

    async fn find(&self, id: Uuid) -> AppResult<Permission> {
        self.stores
            .roles
            .find_permission(id)
            .await?
            .ok_or_else(|| AppError::not_found("Permission not found"))
    }

    async fn find_group_for(&self, id: Uuid) -> AppResult<PermissionGroup> {
        self.stores
            .roles
            .find_permission_group(id)
            .await?
            .ok_or_else(|| AppError::validation("groupId: permission group does not exist"))
    }
}
