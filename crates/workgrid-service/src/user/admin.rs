//! Admin user management: listing, creation, deletion and role assignment.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use workgrid_auth::rbac::catalog;
use workgrid_auth::session::SessionManager;
use workgrid_core::error::AppError;
use workgrid_core::result::AppResult;
use workgrid_core::types::pagination::{PageRequest, PageResponse};
use workgrid_database::{Stores, UserFilter};
use workgrid_entity::audit::AuditAction;
use workgrid_entity::profile::Profile;
use workgrid_entity::role::{AssignUserRole, UserRole, UserRoleView};
use workgrid_entity::user::User;

use super::provision::{AccountProvisioner, NewUserRequest};
use crate::audit::AuditService;
use crate::context::RequestContext;

/// A user as seen by an administrator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserView {
    #[serde(flatten)]
    pub user: User,
    pub profile: Option<Profile>,
    pub roles: Vec<UserRoleView>,
}

/// Input for assigning a role to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRoleRequest {
    pub role_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Handles administrative user management operations.
#[derive(Debug, Clone)]
pub struct AdminUserService {
    stores: Stores,
    sessions: Arc<SessionManager>,
    provisioner: AccountProvisioner,
    audit: AuditService,
}

impl AdminUserService {
    /// Creates a new admin user service.
    pub fn new(
        stores: Stores,
        sessions: Arc<SessionManager>,
        provisioner: AccountProvisioner,
        audit: AuditService,
    ) -> Self {
        Self {
            stores,
            sessions,
            provisioner,
            audit,
        }
    }

    /// Lists non-deleted users with pagination.
    pub async fn list_users(
        &self,
        ctx: &RequestContext,
        filter: UserFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<User>> {
        ctx.require(catalog::USERS_READ)?;
        let page = page.normalized();
        let (items, total) = self.stores.accounts.list_users(&filter, page).await?;
        Ok(PageResponse::new(items, page, total))
    }

    /// Gets a single user with profile and every role assignment.
    pub async fn get_user(&self, ctx: &RequestContext, user_id: Uuid) -> AppResult<AdminUserView> {
        ctx.require(catalog::USERS_READ)?;
        let user = self.find(user_id).await?;
        let profile = self
            .stores
            .accounts
            .find_profile(user.id, user.user_type)
            .await?;
        let roles = self.stores.roles.list_user_roles(user.id).await?;
        Ok(AdminUserView {
            user,
            profile,
            roles,
        })
    }

    /// Creates a user of any actor type, including admins.
    pub async fn create_user(
        &self,
        ctx: &RequestContext,
        req: NewUserRequest,
        role_ids: Vec<Uuid>,
    ) -> AppResult<User> {
        ctx.require(catalog::USERS_WRITE)?;

        let user = self
            .provisioner
            .provision(req, None, &role_ids, Some(ctx.user_id))
            .await?;

        self.audit
            .record(
                Some(ctx),
                AuditAction::UserCreate,
                Some(user.id),
                json!({ "userType": user.user_type, "roleIds": role_ids }),
            )
            .await?;

        info!(admin_id = %ctx.user_id, new_user_id = %user.id, "User created by admin");
        Ok(user)
    }

    /// Soft-deletes a user and ends all their sessions.
    pub async fn delete_user(&self, ctx: &RequestContext, user_id: Uuid) -> AppResult<()> {
        ctx.require(catalog::USERS_WRITE)?;

        if user_id == ctx.user_id {
            return Err(AppError::validation("You cannot delete your own account"));
        }
        if !self.stores.accounts.soft_delete_user(user_id).await? {
            return Err(AppError::not_found("User not found"));
        }
        self.sessions.force_logout(user_id, "user deleted").await?;

        self.audit
            .record(Some(ctx), AuditAction::UserDelete, Some(user_id), json!({}))
            .await?;

        info!(admin_id = %ctx.user_id, user_id = %user_id, "User deleted");
        Ok(())
    }

    /// Every role assignment of a user.
    pub async fn list_user_roles(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
    ) -> AppResult<Vec<UserRoleView>> {
        ctx.require(catalog::USERS_READ)?;
        self.find(user_id).await?;
        self.stores.roles.list_user_roles(user_id).await
    }

    /// Assigns a role, optionally tenant-scoped and expiring. The role's
    /// actor type must match the user's type.
    pub async fn assign_role(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        req: AssignRoleRequest,
    ) -> AppResult<UserRole> {
        ctx.require(catalog::USERS_WRITE)?;

        let user = self.find(user_id).await?;
        let role = self
            .stores
            .roles
            .find_role(req.role_id)
            .await?
            .ok_or_else(|| AppError::not_found("Role not found"))?;

        if role.actor_type != user.user_type {
            return Err(AppError::validation(format!(
                "roleId: role {} cannot be held by {} users",
                role.name, user.user_type
            )));
        }
        if !role.is_active {
            return Err(AppError::validation(format!(
                "roleId: role {} is inactive",
                role.name
            )));
        }
        if req.expires_at.is_some_and(|exp| exp <= Utc::now()) {
            return Err(AppError::validation("expiresAt: must be in the future"));
        }

        let assignment = self
            .stores
            .roles
            .assign_user_role(AssignUserRole {
                user_id,
                role_id: role.id,
                tenant_id: req.tenant_id,
                expires_at: req.expires_at,
                assigned_by_id: Some(ctx.user_id),
            })
            .await?;

        self.audit
            .record(
                Some(ctx),
                AuditAction::UserRoleAssign,
                Some(user_id),
                json!({
                    "roleId": role.id,
                    "roleName": role.name,
                    "tenantId": req.tenant_id,
                    "expiresAt": req.expires_at,
                }),
            )
            .await?;

        info!(admin_id = %ctx.user_id, user_id = %user_id, role = %role.name, "Role assigned");
        Ok(assignment)
    }

    /// Revokes a role. `tenant_id: None` revokes it in every scope.
    ///
    /// Revoking a role from an admin logs that admin out everywhere.
    pub async fn revoke_role(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        role_id: Uuid,
        tenant_id: Option<Uuid>,
    ) -> AppResult<()> {
        ctx.require(catalog::USERS_WRITE)?;

        let user = self.find(user_id).await?;
        if !self
            .stores
            .roles
            .revoke_user_role(user_id, role_id, tenant_id)
            .await?
        {
            return Err(AppError::not_found("Role assignment not found"));
        }

        if user.user_type.is_admin() {
            self.sessions.force_logout(user_id, "role revoked").await?;
        }

        self.audit
            .record(
                Some(ctx),
                AuditAction::UserRoleRevoke,
                Some(user_id),
                json!({ "roleId": role_id, "tenantId": tenant_id }),
            )
            .await?;

        info!(admin_id = %ctx.user_id, user_id = %user_id, role_id = %role_id, "Role revoked");
        Ok(())
    }

    async fn find(&self, user_id: Uuid) -> AppResult<User> {
        self.stores
            .accounts
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }
}
