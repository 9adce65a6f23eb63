//! Role CRUD and role-permission links.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use workgrid_auth::rbac::catalog;
use workgrid_core::error::AppError;
use workgrid_core::result::AppResult;
use workgrid_core::types::pagination::{PageRequest, PageResponse};
use workgrid_database::{RoleFilter, Stores};
use workgrid_entity::audit::AuditAction;
use workgrid_entity::role::{CreateRole, Permission, Role, UpdateRole, is_valid_role_name};
use workgrid_entity::user::UserType;

use crate::audit::AuditService;
use crate::context::RequestContext;

/// Input for creating a role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleRequest {
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub actor_type: UserType,
    pub parent_id: Option<Uuid>,
}

/// Partial role update. `parent_id: Some(None)` clears the parent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub parent_id: Option<Option<Uuid>>,
}

/// A role with the permissions granted to it directly.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleDetail {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<Permission>,
}

/// Manages roles and which permissions they grant.
#[derive(Debug, Clone)]
pub struct RoleService {
    stores: Stores,
    audit: AuditService,
}

impl RoleService {
    /// Creates a new role service.
    pub fn new(stores: Stores, audit: AuditService) -> Self {
        Self { stores, audit }
    }

    /// Lists roles.
    pub async fn list_roles(
        &self,
        ctx: &RequestContext,
        filter: RoleFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<Role>> {
        ctx.require(catalog::ROLES_READ)?;
        let page = page.normalized();
        let (items, total) = self.stores.roles.list_roles(&filter, page).await?;
        Ok(PageResponse::new(items, page, total))
    }

    /// Gets a role with its permissions.
    pub async fn get_role(&self, ctx: &RequestContext, id: Uuid) -> AppResult<RoleDetail> {
        ctx.require(catalog::ROLES_READ)?;
        let role = self.find(id).await?;
        let permissions = self.stores.roles.role_permissions(id).await?;
        Ok(RoleDetail { role, permissions })
    }

    /// Creates a custom (non-system) role.
    pub async fn create_role(&self, ctx: &RequestContext, req: CreateRoleRequest) -> AppResult<Role> {
        ctx.require(catalog::ROLES_WRITE)?;

        if !is_valid_role_name(&req.name) {
            return Err(AppError::validation(
                "name: must be UPPER_SNAKE_CASE (A-Z, 0-9, _)",
            ));
        }
        if let Some(parent_id) = req.parent_id {
            self.find_parent(parent_id).await?;
        }

        let role = self
            .stores
            .roles
            .create_role(CreateRole {
                name: req.name,
                display_name: req.display_name,
                description: req.description,
                actor_type: req.actor_type,
                is_system: false,
                parent_id: req.parent_id,
            })
            .await?;

        self.audit
            .record(
                Some(ctx),
                AuditAction::RoleCreate,
                Some(role.id),
                json!({ "name": role.name, "actorType": role.actor_type }),
            )
            .await?;

        info!(actor_id = %ctx.user_id, role = %role.name, "Role created");
        Ok(role)
    }

    /// Updates a role. The parent must exist and must not create a cycle.
    pub async fn update_role(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        req: UpdateRoleRequest,
    ) -> AppResult<Role> {
        ctx.require(catalog::ROLES_WRITE)?;
        self.find(id).await?;

        if let Some(Some(parent_id)) = req.parent_id {
            if parent_id == id {
                return Err(AppError::validation("parentId: a role cannot be its own parent"));
            }
            self.find_parent(parent_id).await?;
            self.ensure_no_cycle(id, parent_id).await?;
        }

        let role = self
            .stores
            .roles
            .update_role(
                id,
                UpdateRole {
                    display_name: req.display_name,
                    description: req.description,
                    is_active: req.is_active,
                    parent_id: req.parent_id,
                },
            )
            .await?
            .ok_or_else(|| AppError::not_found("Role not found"))?;

        self.audit
            .record(
                Some(ctx),
                AuditAction::RoleUpdate,
                Some(role.id),
                json!({ "name": role.name, "isActive": role.is_active, "parentId": role.parent_id }),
            )
            .await?;

        Ok(role)
    }

    /// Deletes a custom role that nobody holds.
    pub async fn delete_role(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        ctx.require(catalog::ROLES_WRITE)?;
        let role = self.find(id).await?;

        if role.is_system {
            return Err(AppError::forbidden("System roles cannot be deleted"));
        }
        let holders = self.stores.roles.count_active_assignments(id).await?;
        if holders > 0 {
            return Err(AppError::conflict(format!(
                "Role is assigned to {holders} user(s); revoke it first"
            )));
        }

        if !self.stores.roles.delete_role(id).await? {
            return Err(AppError::not_found("Role not found"));
        }

        self.audit
            .record(
                Some(ctx),
                AuditAction::RoleDelete,
                Some(id),
                json!({ "name": role.name }),
            )
            .await?;

        info!(actor_id = %ctx.user_id, role = %role.name, "Role deleted");
        Ok(())
    }

    /// Permissions granted directly to a role.
    pub async fn role_permissions(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> AppResult<Vec<Permission>> {
        ctx.require(catalog::ROLES_READ)?;
        self.find(id).await?;
        self.stores.roles.role_permissions(id).await
    }

    /// Grants permissions to a role. Returns how many links were added;
    /// permissions the role already had are not counted.
    pub async fn assign_permissions(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        permission_ids: Vec<Uuid>,
    ) -> AppResult<u64> {
        ctx.require(catalog::ROLES_WRITE)?;
        self.find(id).await?;
        let permission_ids = self.existing_permissions(permission_ids).await?;

        let assigned = self
            .stores
            .roles
            .assign_permissions(id, &permission_ids, Some(ctx.user_id))
            .await?;

        self.audit
            .record(
                Some(ctx),
                AuditAction::RolePermissionsAssign,
                Some(id),
                json!({ "permissionIds": permission_ids, "count": assigned }),
            )
            .await?;

        info!(actor_id = %ctx.user_id, role_id = %id, assigned, "Permissions assigned to role");
        Ok(assigned)
    }

    /// Removes permissions from a role. Returns how many links were removed.
    pub async fn revoke_permissions(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        permission_ids: Vec<Uuid>,
    ) -> AppResult<u64> {
        ctx.require(catalog::ROLES_WRITE)?;
        self.find(id).await?;
        let permission_ids = dedup(permission_ids);

        let revoked = self
            .stores
            .roles
            .revoke_permissions(id, &permission_ids)
            .await?;

        self.audit
            .record(
                Some(ctx),
                AuditAction::RolePermissionsRevoke,
                Some(id),
                json!({ "permissionIds": permission_ids, "count": revoked }),
            )
            .await?;

        info!(actor_id = %ctx.user_id, role_id = %id, revoked, "Permissions revoked from role");
        Ok(revoked)
    }

    async fn find(&self, id: Uuid) -> AppResult<Role> {
        self.stores
            .roles
            .find_role(id)
            .await?
            .ok_or_else(|| AppError::not_found("Role not found"))
    }

    async fn find_parent(&self, id: Uuid) -> AppResult<Role> {
        self.stores
            .roles
            .find_role(id)
            .await?
            .ok_or_else(|| AppError::validation("parentId: parent role does not exist"))
    }

    /// Walks up from `parent_id`; reaching `role_id` means a cycle.
    async fn ensure_no_cycle(&self, role_id: Uuid, parent_id: Uuid) -> AppResult<()> {
        let mut seen = HashSet::new();
        let mut cursor = Some(parent_id);
        while let Some(current) = cursor {
            if current == role_id {
                return Err(AppError::validation(
                    "parentId: would create a cycle in the role hierarchy",
                ));
            }
            if !seen.insert(current) {
                break;
            }
            cursor = self
                .stores
                .roles
                .find_role(current)
                .await?
                .and_then(|r| r.parent_id);
        }
        Ok(())
    }

    async fn existing_permissions(&self, ids: Vec<Uuid>) -> AppResult<Vec<Uuid>> {
        let ids = dedup(ids);
        if ids.is_empty() {
            return Err(AppError::validation("permissionIds: must not be empty"));
        }
        let mut missing = Vec::new();
        for id in &ids {
            if self.stores.roles.find_permission(*id).await?.is_none() {
                missing.push(format!("permissionIds: permission {id} does not exist"));
            }
        }
        if !missing.is_empty() {
            return Err(AppError::validation_failed(missing));
        }
        Ok(ids)
    }
}

fn dedup(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
