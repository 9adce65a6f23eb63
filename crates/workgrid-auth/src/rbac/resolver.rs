//! Live resolution of a user's roles and permissions.
//!
//! Permissions come only from roles the user holds directly. A role's
//! `parent_id` is never walked.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use workgrid_core::result::AppResult;
use workgrid_database::RoleStore;
use workgrid_entity::role::{ActiveRole, Role};
use workgrid_entity::user::UserType;

/// Roles and permissions in effect for one principal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAccess {
    /// Role names, deduplicated and sorted.
    pub roles: Vec<String>,
    /// Permission names, deduplicated and sorted.
    pub permissions: Vec<String>,
    /// Tenant of the first tenant-scoped assignment.
    pub tenant_id: Option<Uuid>,
}

/// Resolves effective access from the role store on every call.
#[derive(Debug, Clone)]
pub struct PermissionResolver {
    roles: Arc<dyn RoleStore>,
}

impl PermissionResolver {
    /// Creates a resolver over the given role store.
    pub fn new(roles: Arc<dyn RoleStore>) -> Self {
        Self { roles }
    }

    /// Active roles behind the user's active, unexpired assignments.
    pub async fn active_roles(&self, user_id: Uuid) -> AppResult<Vec<ActiveRole>> {
        self.roles.active_roles_for_user(user_id, Utc::now()).await
    }

    /// Full resolution across every active role of the user.
    pub async fn resolve_user(&self, user_id: Uuid) -> AppResult<ResolvedAccess> {
        let active = self.active_roles(user_id).await?;
        self.resolve_roles(&active).await
    }

    /// Resolution over an already loaded set of active roles.
    pub async fn resolve_roles(&self, active: &[ActiveRole]) -> AppResult<ResolvedAccess> {
        let role_ids: Vec<Uuid> = active.iter().map(|a| a.role.id).collect();
        let permissions = if role_ids.is_empty() {
            Vec::new()
        } else {
            self.roles.permission_names_for_roles(&role_ids).await?
        };

        let roles: BTreeSet<String> = active.iter().map(|a| a.role.name.clone()).collect();
        let permissions: BTreeSet<String> = permissions.into_iter().collect();

        Ok(ResolvedAccess {
            roles: roles.into_iter().collect(),
            permissions: permissions.into_iter().collect(),
            tenant_id: active.iter().find_map(|a| a.tenant_id),
        })
    }

    /// Resolution scoped to a single role, as used for a selected admin role.
    pub async fn resolve_for_role(&self, role: &Role) -> AppResult<ResolvedAccess> {
        let permissions = self.roles.permission_names_for_roles(&[role.id]).await?;
        Ok(ResolvedAccess {
            roles: vec![role.name.clone()],
            permissions,
            tenant_id: None,
        })
    }

    /// Distinct active roles an admin may act as.
    ///
    /// One role held under several scopes is listed once.
    pub async fn admin_roles(&self, user_id: Uuid) -> AppResult<Vec<Role>> {
        let mut seen = HashSet::new();
        Ok(self
            .active_roles(user_id)
            .await?
            .into_iter()
            .filter(|a| a.role.actor_type == UserType::Admin && seen.insert(a.role.id))
            .map(|a| a.role)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use workgrid_database::{NewAccount, NewProfile, Stores};
    use workgrid_entity::role::{AssignUserRole, CreatePermission, CreateRole};
    use workgrid_entity::user::CreateUser;

    use super::*;

    async fn role_with(stores: &Stores, name: &str, perms: &[&str], parent: Option<Uuid>) -> Role {
        let role = stores
            .roles
            .create_role(CreateRole {
                name: name.into(),
                display_name: name.into(),
                description: None,
                actor_type: UserType::Sp,
                is_system: false,
                parent_id: parent,
            })
            .await
            .unwrap();
        let mut ids = Vec::new();
        for perm in perms {
            let p = match stores.roles.find_permission_by_name(perm).await.unwrap() {
                Some(p) => p,
                None => stores
                    .roles
                    .create_permission(CreatePermission {
                        name: (*perm).into(),
                        description: None,
                        group_id: None,
                    })
                    .await
                    .unwrap(),
            };
            ids.push(p.id);
        }
        stores.roles.assign_permissions(role.id, &ids, None).await.unwrap();
        role
    }

    async fn user(stores: &Stores) -> Uuid {
        let user_id = Uuid::new_v4();
        stores
            .accounts
            .create_account(NewAccount {
                user_id,
                user: CreateUser {
                    phone: "9000000001".into(),
                    email: None,
                    password_hash: "x".into(),
                    user_type: UserType::Sp,
                },
                tenant: None,
                profile: NewProfile::Sp,
                roles: Vec::new(),
            })
            .await
            .unwrap();
        user_id
    }

    fn assign(user_id: Uuid, role_id: Uuid) -> AssignUserRole {
        AssignUserRole {
            user_id,
            role_id,
            tenant_id: None,
            expires_at: None,
            assigned_by_id: None,
        }
    }

    #[tokio::test]
    async fn test_union_is_sorted_and_deduplicated() {
        let stores = Stores::memory();
        let user_id = user(&stores).await;
        let a = role_with(&stores, "ROLE_B", &["jobs:read", "jobs:accept"], None).await;
        let b = role_with(&stores, "ROLE_A", &["jobs:read", "profile:read"], None).await;
        stores.roles.assign_user_role(assign(user_id, a.id)).await.unwrap();
        stores.roles.assign_user_role(assign(user_id, b.id)).await.unwrap();

        let resolved = PermissionResolver::new(stores.roles.clone())
            .resolve_user(user_id)
            .await
            .unwrap();
        assert_eq!(resolved.roles, vec!["ROLE_A", "ROLE_B"]);
        assert_eq!(
            resolved.permissions,
            vec!["jobs:accept", "jobs:read", "profile:read"]
        );
    }

    #[tokio::test]
    async fn test_parent_permissions_are_not_inherited() {
        let stores = Stores::memory();
        let user_id = user(&stores).await;
        let parent = role_with(&stores, "PARENT", &["users:write"], None).await;
        let child = role_with(&stores, "CHILD", &["jobs:read"], Some(parent.id)).await;
        stores.roles.assign_user_role(assign(user_id, child.id)).await.unwrap();

        let resolved = PermissionResolver::new(stores.roles.clone())
            .resolve_user(user_id)
            .await
            .unwrap();
        assert_eq!(resolved.permissions, vec!["jobs:read"]);
    }

    #[tokio::test]
    async fn test_expired_and_inactive_assignments_ignored() {
        let stores = Stores::memory();
        let user_id = user(&stores).await;
        let expired = role_with(&stores, "EXPIRED", &["jobs:write"], None).await;
        let disabled = role_with(&stores, "DISABLED", &["kyc:review"], None).await;
        stores
            .roles
            .assign_user_role(AssignUserRole {
                expires_at: Some(Utc::now() - Duration::minutes(1)),
                ..assign(user_id, expired.id)
            })
            .await
            .unwrap();
        stores.roles.assign_user_role(assign(user_id, disabled.id)).await.unwrap();
        stores
            .roles
            .update_role(
                disabled.id,
                workgrid_entity::role::UpdateRole {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let resolved = PermissionResolver::new(stores.roles.clone())
            .resolve_user(user_id)
            .await
            .unwrap();
        assert!(resolved.roles.is_empty());
        assert!(resolved.permissions.is_empty());
    }

    #[tokio::test]
    async fn test_admin_role_held_under_two_scopes_listed_once() {
        let stores = Stores::memory();
        let user_id = user(&stores).await;
        let role = stores
            .roles
            .create_role(CreateRole {
                name: "OPS_ADMIN".into(),
                display_name: "Ops".into(),
                description: None,
                actor_type: UserType::Admin,
                is_system: false,
                parent_id: None,
            })
            .await
            .unwrap();
        stores.roles.assign_user_role(assign(user_id, role.id)).await.unwrap();
        stores
            .roles
            .assign_user_role(AssignUserRole {
                tenant_id: Some(Uuid::new_v4()),
                ..assign(user_id, role.id)
            })
            .await
            .unwrap();

        let roles = PermissionResolver::new(stores.roles.clone())
            .admin_roles(user_id)
            .await
            .unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].id, role.id);
    }
}
