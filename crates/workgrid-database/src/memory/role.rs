use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use workgrid_core::error::AppError;
use workgrid_core::result::AppResult;
use workgrid_core::types::pagination::PageRequest;
use workgrid_entity::role::{
    ActiveRole, AssignUserRole, CreatePermission, CreatePermissionGroup, CreateRole, Permission,
    PermissionGroup, Role, RolePermission, UpdatePermission, UpdateRole, UserRole, UserRoleView,
};

use super::{MemoryStore, paginate};
use crate::store::{RoleFilter, RoleStore};

#[async_trait]
impl RoleStore for MemoryStore {
    async fn create_role(&self, role: CreateRole) -> AppResult<Role> {
        let mut state = self.state.write().await;
        if state.roles.values().any(|r| r.name == role.name) {
            return Err(AppError::conflict("Role name already exists"));
        }
        if let Some(parent_id) = role.parent_id {
            if !state.roles.contains_key(&parent_id) {
                return Err(AppError::validation("Referenced record does not exist"));
            }
        }
        let now = Utc::now();
        let created = Role {
            id: Uuid::new_v4(),
            name: role.name,
            display_name: role.display_name,
            description: role.description,
            actor_type: role.actor_type,
            is_system: role.is_system,
            is_active: true,
            parent_id: role.parent_id,
            created_at: now,
            updated_at: now,
        };
        state.roles.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_role(&self, id: Uuid) -> AppResult<Option<Role>> {
        Ok(self.state.read().await.roles.get(&id).cloned())
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let state = self.state.read().await;
        Ok(state.roles.values().find(|r| r.name == name).cloned())
    }

    async fn list_roles(
        &self,
        filter: &RoleFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<Role>, u64)> {
        let state = self.state.read().await;
        let mut roles: Vec<Role> = state
            .roles
            .values()
            .filter(|r| filter.actor_type.is_none_or(|t| r.actor_type == t))
            .filter(|r| filter.is_active.is_none_or(|a| r.is_active == a))
            .cloned()
            .collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(paginate(roles, page))
    }

    async fn update_role(&self, id: Uuid, update: UpdateRole) -> AppResult<Option<Role>> {
        let mut state = self.state.write().await;
        if let Some(Some(parent_id)) = update.parent_id {
            if !state.roles.contains_key(&parent_id) {
                return Err(AppError::validation("Referenced record does not exist"));
            }
        }
        let Some(role) = state.roles.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(display_name) = update.display_name {
            role.display_name = display_name;
        }
        if let Some(description) = update.description {
            role.description = Some(description);
        }
        if let Some(is_active) = update.is_active {
            role.is_active = is_active;
        }
        if let Some(parent_id) = update.parent_id {
            role.parent_id = parent_id;
        }
        role.updated_at = Utc::now();
        Ok(Some(role.clone()))
    }

    async fn delete_role(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if state.roles.remove(&id).is_none() {
            return Ok(false);
        }
        state.role_permissions.retain(|(role_id, _), _| *role_id != id);
        state.user_roles.retain(|_, ur| ur.role_id != id);
        state.admin_sessions.retain(|_, s| s.role_id != id);
        for role in state.roles.values_mut() {
            if role.parent_id == Some(id) {
                role.parent_id = None;
            }
        }
        for profile in state.admin_profiles.values_mut() {
            if profile.active_role_id == Some(id) {
                profile.active_role_id = None;
            }
        }
        Ok(true)
    }

    async fn count_active_assignments(&self, role_id: Uuid) -> AppResult<u64> {
        let state = self.state.read().await;
        let now = Utc::now();
        Ok(state
            .user_roles
            .values()
            .filter(|ur| ur.role_id == role_id && ur.is_effective_at(now))
            .count() as u64)
    }

    async fn create_permission(&self, permission: CreatePermission) -> AppResult<Permission> {
        let mut state = self.state.write().await;
        if state.permissions.values().any(|p| p.name == permission.name) {
            return Err(AppError::conflict("Permission name already exists"));
        }
        if let Some(group_id) = permission.group_id {
            if !state.permission_groups.contains_key(&group_id) {
                return Err(AppError::validation("Referenced record does not exist"));
            }
        }
        let created = Permission {
            id: Uuid::new_v4(),
            name: permission.name,
            description: permission.description,
            group_id: permission.group_id,
            created_at: Utc::now(),
        };
        state.permissions.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_permission(&self, id: Uuid) -> AppResult<Option<Permission>> {
        Ok(self.state.read().await.permissions.get(&id).cloned())
    }

    async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<Permission>> {
        let state = self.state.read().await;
        Ok(state.permissions.values().find(|p| p.name == name).cloned())
    }

    async fn list_permissions(
        &self,
        group_id: Option<Uuid>,
        page: PageRequest,
    ) -> AppResult<(Vec<Permission>, u64)> {
        let state = self.state.read().await;
        let mut permissions: Vec<Permission> = state
            .permissions
            .values()
            .filter(|p| group_id.is_none_or(|g| p.group_id == Some(g)))
            .cloned()
            .collect();
        permissions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(paginate(permissions, page))
    }

    async fn update_permission(
        &self,
        id: Uuid,
        update: UpdatePermission,
    ) -> AppResult<Option<Permission>> {
        let mut state = self.state.write().await;
        if let Some(Some(group_id)) = update.group_id {
            if !state.permission_groups.contains_key(&group_id) {
                return Err(AppError::validation("Referenced record does not exist"));
            }
        }
        let Some(permission) = state.permissions.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(description) = update.description {
            permission.description = Some(description);
        }
        if let Some(group_id) = update.group_id {
            permission.group_id = group_id;
        }
        Ok(Some(permission.clone()))
    }

    async fn delete_permission(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if state.permissions.remove(&id).is_none() {
            return Ok(false);
        }
        state.role_permissions.retain(|(_, permission_id), _| *permission_id != id);
        Ok(true)
    }

    async fn create_permission_group(
        &self,
        group: CreatePermissionGroup,
    ) -> AppResult<PermissionGroup> {
        let mut state = self.state.write().await;
        if state.permission_groups.values().any(|g| g.name == group.name) {
            return Err(AppError::conflict("Permission group name already exists"));
        }
        let created = PermissionGroup {
            id: Uuid::new_v4(),
            name: group.name,
            display_name: group.display_name,
            created_at: Utc::now(),
        };
        state.permission_groups.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_permission_group(&self, id: Uuid) -> AppResult<Option<PermissionGroup>> {
        Ok(self.state.read().await.permission_groups.get(&id).cloned())
    }

    async fn find_permission_group_by_name(
        &self,
        name: &str,
    ) -> AppResult<Option<PermissionGroup>> {
        let state = self.state.read().await;
        Ok(state.permission_groups.values().find(|g| g.name == name).cloned())
    }

    async fn list_permission_groups(&self) -> AppResult<Vec<PermissionGroup>> {
        let state = self.state.read().await;
        let mut groups: Vec<PermissionGroup> = state.permission_groups.values().cloned().collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    async fn role_permissions(&self, role_id: Uuid) -> AppResult<Vec<Permission>> {
        let state = self.state.read().await;
        let mut permissions: Vec<Permission> = state
            .role_permissions
            .keys()
            .filter(|(r, _)| *r == role_id)
            .filter_map(|(_, p)| state.permissions.get(p).cloned())
            .collect();
        permissions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(permissions)
    }

    async fn assign_permissions(
        &self,
        role_id: Uuid,
        permission_ids: &[Uuid],
        granted_by: Option<Uuid>,
    ) -> AppResult<u64> {
        let mut state = self.state.write().await;
        if !state.roles.contains_key(&role_id)
            || permission_ids.iter().any(|p| !state.permissions.contains_key(p))
        {
            return Err(AppError::validation("Referenced record does not exist"));
        }
        let now = Utc::now();
        let mut created = 0;
        for permission_id in permission_ids {
            let key = (role_id, *permission_id);
            if state.role_permissions.contains_key(&key) {
                continue;
            }
            state.role_permissions.insert(
                key,
                RolePermission {
                    role_id,
                    permission_id: *permission_id,
                    granted_by_id: granted_by,
                    created_at: now,
                },
            );
            created += 1;
        }
        Ok(created)
    }

    async fn revoke_permissions(&self, role_id: Uuid, permission_ids: &[Uuid]) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let mut removed = 0;
        for permission_id in permission_ids {
            if state.role_permissions.remove(&(role_id, *permission_id)).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn permission_names_for_roles(&self, role_ids: &[Uuid]) -> AppResult<Vec<String>> {
        let state = self.state.read().await;
        let names: BTreeSet<String> = state
            .role_permissions
            .keys()
            .filter(|(r, _)| role_ids.contains(r))
            .filter_map(|(_, p)| state.permissions.get(p).map(|p| p.name.clone()))
            .collect();
        Ok(names.into_iter().collect())
    }

    async fn assign_user_role(&self, assignment: AssignUserRole) -> AppResult<UserRole> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&assignment.user_id)
            || !state.roles.contains_key(&assignment.role_id)
        {
            return Err(AppError::validation("Referenced record does not exist"));
        }
        let now = Utc::now();
        let existing = state.user_roles.values_mut().find(|ur| {
            ur.user_id == assignment.user_id
                && ur.role_id == assignment.role_id
                && ur.tenant_id == assignment.tenant_id
        });
        if let Some(existing) = existing {
            if existing.is_effective_at(now) {
                return Err(AppError::conflict("Role already assigned to user"));
            }
            existing.is_active = true;
            existing.expires_at = assignment.expires_at;
            existing.assigned_by_id = assignment.assigned_by_id;
            return Ok(existing.clone());
        }
        let created = UserRole {
            id: Uuid::new_v4(),
            user_id: assignment.user_id,
            role_id: assignment.role_id,
            tenant_id: assignment.tenant_id,
            is_active: true,
            expires_at: assignment.expires_at,
            assigned_by_id: assignment.assigned_by_id,
            created_at: now,
        };
        state.user_roles.insert(created.id, created.clone());
        Ok(created)
    }

    async fn revoke_user_role(
        &self,
        user_id: Uuid,
        role_id: Uuid,
        tenant_id: Option<Uuid>,
    ) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let mut revoked = false;
        for ur in state.user_roles.values_mut() {
            if ur.user_id == user_id
                && ur.role_id == role_id
                && ur.is_active
                && tenant_id.is_none_or(|t| ur.tenant_id == Some(t))
            {
                ur.is_active = false;
                revoked = true;
            }
        }
        Ok(revoked)
    }

    async fn list_user_roles(&self, user_id: Uuid) -> AppResult<Vec<UserRoleView>> {
        let state = self.state.read().await;
        let mut views: Vec<UserRoleView> = state
            .user_roles
            .values()
            .filter(|ur| ur.user_id == user_id)
            .filter_map(|ur| {
                state.roles.get(&ur.role_id).map(|role| UserRoleView {
                    assignment: ur.clone(),
                    role_name: role.name.clone(),
                    role_display_name: role.display_name.clone(),
                })
            })
            .collect();
        views.sort_by(|a, b| a.assignment.created_at.cmp(&b.assignment.created_at));
        Ok(views)
    }

    async fn active_roles_for_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<ActiveRole>> {
        let state = self.state.read().await;
        let mut assignments: Vec<&UserRole> = state
            .user_roles
            .values()
            .filter(|ur| ur.user_id == user_id && ur.is_effective_at(now))
            .collect();
        assignments.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        let mut roles: Vec<ActiveRole> = assignments
            .into_iter()
            .filter_map(|ur| {
                state
                    .roles
                    .get(&ur.role_id)
                    .filter(|r| r.is_active)
                    .map(|role| ActiveRole {
                        role: role.clone(),
                        tenant_id: ur.tenant_id,
                    })
            })
            .collect();
        roles.sort_by(|a, b| a.role.name.cmp(&b.role.name));
        Ok(roles)
    }
}
