//! Role graph repository: roles, permissions, groups and assignments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use workgrid_core::error::AppError;
use workgrid_core::result::AppResult;
use workgrid_core::types::pagination::PageRequest;
use workgrid_entity::role::{
    ActiveRole, AssignUserRole, CreatePermission, CreatePermissionGroup, CreateRole, Permission,
    PermissionGroup, Role, UpdatePermission, UpdateRole, UserRole, UserRoleView,
};

use super::db_err;
use crate::store::{RoleFilter, RoleStore};

/// PostgreSQL-backed [`RoleStore`].
#[derive(Debug, Clone)]
pub struct PgRoleRepository {
    pool: PgPool,
}

impl PgRoleRepository {
    /// Create a new role repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleStore for PgRoleRepository {
    async fn create_role(&self, role: CreateRole) -> AppResult<Role> {
        sqlx::query_as::<_, Role>(
            "INSERT INTO roles (id, name, display_name, description, actor_type, is_system, parent_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&role.name)
        .bind(&role.display_name)
        .bind(&role.description)
        .bind(role.actor_type)
        .bind(role.is_system)
        .bind(role.parent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to create role"))
    }

    async fn find_role(&self, id: Uuid) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find role"))
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find role by name"))
    }

    async fn list_roles(
        &self,
        filter: &RoleFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<Role>, u64)> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM roles \
             WHERE ($1::user_type IS NULL OR actor_type = $1) \
             AND ($2::boolean IS NULL OR is_active = $2)",
        )
        .bind(filter.actor_type)
        .bind(filter.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to count roles"))?;

        let roles = sqlx::query_as::<_, Role>(
            "SELECT * FROM roles \
             WHERE ($1::user_type IS NULL OR actor_type = $1) \
             AND ($2::boolean IS NULL OR is_active = $2) \
             ORDER BY name LIMIT $3 OFFSET $4",
        )
        .bind(filter.actor_type)
        .bind(filter.is_active)
        .bind(page.limit as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list roles"))?;

        Ok((roles, total as u64))
    }

    async fn update_role(&self, id: Uuid, update: UpdateRole) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, Role>(
            "UPDATE roles SET \
                display_name = COALESCE($2, display_name), \
                description = COALESCE($3, description), \
                is_active = COALESCE($4, is_active), \
                parent_id = CASE WHEN $5 THEN $6 ELSE parent_id END, \
                updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&update.display_name)
        .bind(&update.description)
        .bind(update.is_active)
        .bind(update.parent_id.is_some())
        .bind(update.parent_id.flatten())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to update role"))
    }

    async fn delete_role(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to delete role"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_active_assignments(&self, role_id: Uuid) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_roles \
             WHERE role_id = $1 AND is_active AND (expires_at IS NULL OR expires_at > NOW())",
        )
        .bind(role_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to count role assignments"))?;
        Ok(count as u64)
    }

    async fn create_permission(&self, permission: CreatePermission) -> AppResult<Permission> {
        sqlx::query_as::<_, Permission>(
            "INSERT INTO permissions (id, name, description, group_id) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&permission.name)
        .bind(&permission.description)
        .bind(permission.group_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to create permission"))
    }

    async fn find_permission(&self, id: Uuid) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, Permission>("SELECT * FROM permissions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find permission"))
    }

    async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, Permission>("SELECT * FROM permissions WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find permission by name"))
    }

    async fn list_permissions(
        &self,
        group_id: Option<Uuid>,
        page: PageRequest,
    ) -> AppResult<(Vec<Permission>, u64)> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM permissions WHERE ($1::uuid IS NULL OR group_id = $1)",
        )
        .bind(group_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to count permissions"))?;

        let permissions = sqlx::query_as::<_, Permission>(
            "SELECT * FROM permissions WHERE ($1::uuid IS NULL OR group_id = $1) \
             ORDER BY name LIMIT $2 OFFSET $3",
        )
        .bind(group_id)
        .bind(page.limit as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list permissions"))?;

        Ok((permissions, total as u64))
    }

    async fn update_permission(
        &self,
        id: Uuid,
        update: UpdatePermission,
    ) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, Permission>(
            "UPDATE permissions SET \
                description = COALESCE($2, description), \
                group_id = CASE WHEN $3 THEN $4 ELSE group_id END \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&update.description)
        .bind(update.group_id.is_some())
        .bind(update.group_id.flatten())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to update permission"))
    }

    async fn delete_permission(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM permissions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to delete permission"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_permission_group(
        &self,
        group: CreatePermissionGroup,
    ) -> AppResult<PermissionGroup> {
        sqlx::query_as::<_, PermissionGroup>(
            "INSERT INTO permission_groups (id, name, display_name) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&group.name)
        .bind(&group.display_name)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to create permission group"))
    }

    async fn find_permission_group(&self, id: Uuid) -> AppResult<Option<PermissionGroup>> {
        sqlx::query_as::<_, PermissionGroup>("SELECT * FROM permission_groups WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find permission group"))
    }

    async fn find_permission_group_by_name(
        &self,
        name: &str,
    ) -> AppResult<Option<PermissionGroup>> {
        sqlx::query_as::<_, PermissionGroup>("SELECT * FROM permission_groups WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find permission group by name"))
    }

    async fn list_permission_groups(&self) -> AppResult<Vec<PermissionGroup>> {
        sqlx::query_as::<_, PermissionGroup>("SELECT * FROM permission_groups ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("Failed to list permission groups"))
    }

    async fn role_permissions(&self, role_id: Uuid) -> AppResult<Vec<Permission>> {
        sqlx::query_as::<_, Permission>(
            "SELECT p.* FROM permissions p \
             JOIN role_permissions rp ON rp.permission_id = p.id \
             WHERE rp.role_id = $1 ORDER BY p.name",
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to load role permissions"))
    }

    async fn assign_permissions(
        &self,
        role_id: Uuid,
        permission_ids: &[Uuid],
        granted_by: Option<Uuid>,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "INSERT INTO role_permissions (role_id, permission_id, granted_by_id) \
             SELECT $1, pid, $3 FROM UNNEST($2::uuid[]) AS pid \
             ON CONFLICT (role_id, permission_id) DO NOTHING",
        )
        .bind(role_id)
        .bind(permission_ids.to_vec())
        .bind(granted_by)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to assign permissions"))?;
        Ok(result.rows_affected())
    }

    async fn revoke_permissions(&self, role_id: Uuid, permission_ids: &[Uuid]) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM role_permissions WHERE role_id = $1 AND permission_id = ANY($2)",
        )
        .bind(role_id)
        .bind(permission_ids.to_vec())
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to revoke permissions"))?;
        Ok(result.rows_affected())
    }

    async fn permission_names_for_roles(&self, role_ids: &[Uuid]) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT p.name FROM role_permissions rp \
             JOIN permissions p ON p.id = rp.permission_id \
             WHERE rp.role_id = ANY($1) ORDER BY p.name",
        )
        .bind(role_ids.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to resolve permissions"))
    }

    async fn assign_user_role(&self, assignment: AssignUserRole) -> AppResult<UserRole> {
        sqlx::query_as::<_, UserRole>(
            "INSERT INTO user_roles (id, user_id, role_id, tenant_id, expires_at, assigned_by_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT ON CONSTRAINT user_roles_scope_key DO UPDATE SET \
                is_active = TRUE, \
                expires_at = EXCLUDED.expires_at, \
                assigned_by_id = EXCLUDED.assigned_by_id \
             WHERE NOT (user_roles.is_active \
                AND (user_roles.expires_at IS NULL OR user_roles.expires_at > NOW())) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(assignment.user_id)
        .bind(assignment.role_id)
        .bind(assignment.tenant_id)
        .bind(assignment.expires_at)
        .bind(assignment.assigned_by_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to assign role to user"))?
        .ok_or_else(|| AppError::conflict("Role already assigned to user"))
    }

    async fn revoke_user_role(
        &self,
        user_id: Uuid,
        role_id: Uuid,
        tenant_id: Option<Uuid>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE user_roles SET is_active = FALSE \
             WHERE user_id = $1 AND role_id = $2 AND is_active \
             AND ($3::uuid IS NULL OR tenant_id = $3)",
        )
        .bind(user_id)
        .bind(role_id)
        .bind(tenant_id)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to revoke role from user"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_user_roles(&self, user_id: Uuid) -> AppResult<Vec<UserRoleView>> {
        sqlx::query_as::<_, UserRoleView>(
            "SELECT ur.*, r.name AS role_name, r.display_name AS role_display_name \
             FROM user_roles ur JOIN roles r ON r.id = ur.role_id \
             WHERE ur.user_id = $1 ORDER BY ur.created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list user roles"))
    }

    async fn active_roles_for_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<ActiveRole>> {
        sqlx::query_as::<_, ActiveRole>(
            "SELECT r.*, ur.tenant_id FROM user_roles ur \
             JOIN roles r ON r.id = ur.role_id \
             WHERE ur.user_id = $1 AND ur.is_active AND r.is_active \
             AND (ur.expires_at IS NULL OR ur.expires_at > $2) \
             ORDER BY r.name, ur.created_at",
        )
        .bind(user_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to load active roles"))
    }
}
