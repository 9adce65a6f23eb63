//! Idempotent seeding of the permission catalog and the system roles.

use std::collections::HashMap;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use workgrid_auth::rbac::catalog::{PERMISSION_GROUPS, SYSTEM_ROLES};
use workgrid_core::error::AppError;
use workgrid_core::result::AppResult;
use workgrid_database::Stores;
use workgrid_entity::role::{CreatePermission, CreatePermissionGroup, CreateRole};

/// What a seeding run created. All zeros on a fully seeded store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub groups_created: u64,
    pub permissions_created: u64,
    pub roles_created: u64,
    pub links_created: u64,
}

/// Creates whatever part of the catalog is missing. Existing rows are left
/// as they are, so permissions an operator removed from a system role are
/// granted again.
pub async fn seed_catalog(stores: &Stores) -> AppResult<SeedReport> {
    let mut report = SeedReport::default();
    let mut permission_ids: HashMap<&str, Uuid> = HashMap::new();

    for group in PERMISSION_GROUPS {
        let group_id = match stores.roles.find_permission_group_by_name(group.name).await? {
            Some(existing) => existing.id,
            None => {
                report.groups_created += 1;
                stores
                    .roles
                    .create_permission_group(CreatePermissionGroup {
                        name: group.name.to_string(),
                        display_name: group.display_name.to_string(),
                    })
                    .await?
                    .id
            }
        };

        for &(name, description) in group.permissions {
            let id = match stores.roles.find_permission_by_name(name).await? {
                Some(existing) => existing.id,
                None => {
                    report.permissions_created += 1;
                    stores
                        .roles
                        .create_permission(CreatePermission {
                            name: name.to_string(),
                            description: Some(description.to_string()),
                            group_id: Some(group_id),
                        })
                        .await?
                        .id
                }
            };
            permission_ids.insert(name, id);
        }
    }

    let mut role_ids: HashMap<&str, Uuid> = HashMap::new();
    for def in SYSTEM_ROLES {
        let parent_id = def.parent.and_then(|p| role_ids.get(p).copied());
        let role_id = match stores.roles.find_role_by_name(def.name).await? {
            Some(existing) => existing.id,
            None => {
                report.roles_created += 1;
                stores
                    .roles
                    .create_role(CreateRole {
                        name: def.name.to_string(),
                        display_name: def.display_name.to_string(),
                        description: Some(def.description.to_string()),
                        actor_type: def.actor_type,
                        is_system: true,
                        parent_id,
                    })
                    .await?
                    .id
            }
        };
        role_ids.insert(def.name, role_id);

        let ids = def
            .permissions
            .iter()
            .map(|name| {
                permission_ids.get(name).copied().ok_or_else(|| {
                    AppError::internal(format!("{} grants unknown permission {name}", def.name))
                })
            })
            .collect::<AppResult<Vec<Uuid>>>()?;
        report.links_created += stores.roles.assign_permissions(role_id, &ids, None).await?;
    }

    info!(
        groups = report.groups_created,
        permissions = report.permissions_created,
        roles = report.roles_created,
        links = report.links_created,
        "Catalog seeded"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let stores = Stores::memory();

        let first = seed_catalog(&stores).await.unwrap();
        assert_eq!(first.roles_created, SYSTEM_ROLES.len() as u64);
        assert!(first.links_created > 0);

        let second = seed_catalog(&stores).await.unwrap();
        assert_eq!(second, SeedReport::default());

        let support = stores
            .roles
            .find_role_by_name("SUPPORT_ADMIN")
            .await
            .unwrap()
            .unwrap();
        let parent = stores
            .roles
            .find_role_by_name("SUPER_ADMIN")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(support.parent_id, Some(parent.id));
        assert!(support.is_system);
    }
}
