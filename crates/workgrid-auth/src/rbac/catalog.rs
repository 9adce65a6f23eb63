//! Permission names the server checks, and the system roles seeded on startup.

use workgrid_entity::user::UserType;

pub const ROLES_READ: &str = "roles:read";
pub const ROLES_WRITE: &str = "roles:write";
pub const PERMISSIONS_READ: &str = "permissions:read";
pub const PERMISSIONS_WRITE: &str = "permissions:write";
pub const USERS_READ: &str = "users:read";
pub const USERS_WRITE: &str = "users:write";
pub const AUDIT_READ: &str = "audit:read";
pub const KYC_REVIEW: &str = "kyc:review";
pub const TEAM_READ: &str = "team:read";
pub const TEAM_WRITE: &str = "team:write";
pub const JOBS_READ: &str = "jobs:read";
pub const JOBS_WRITE: &str = "jobs:write";
pub const JOBS_ACCEPT: &str = "jobs:accept";
pub const PROFILE_READ: &str = "profile:read";
pub const PROFILE_WRITE: &str = "profile:write";

/// A seeded permission group and the permissions filed under it.
#[derive(Debug, Clone, Copy)]
pub struct GroupDefinition {
    pub name: &'static str,
    pub display_name: &'static str,
    pub permissions: &'static [(&'static str, &'static str)],
}

/// A seeded system role.
#[derive(Debug, Clone, Copy)]
pub struct RoleDefinition {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub actor_type: UserType,
    /// Informational parent, by name.
    pub parent: Option<&'static str>,
    pub permissions: &'static [&'static str],
}

pub const SUPER_ADMIN: &str = "SUPER_ADMIN";
pub const SUPPORT_ADMIN: &str = "SUPPORT_ADMIN";
pub const CLIENT_ADMIN: &str = "CLIENT_ADMIN";
pub const CLIENT_MEMBER: &str = "CLIENT_MEMBER";
pub const SP_BASIC: &str = "SP_BASIC";
pub const PARTNER_BASIC: &str = "PARTNER_BASIC";

pub static PERMISSION_GROUPS: &[GroupDefinition] = &[
    GroupDefinition {
        name: "access_control",
        display_name: "Access Control",
        permissions: &[
            (ROLES_READ, "View roles and their permissions"),
            (ROLES_WRITE, "Create, edit and delete roles"),
            (PERMISSIONS_READ, "View permissions and groups"),
            (PERMISSIONS_WRITE, "Create, edit and delete permissions"),
        ],
    },
    GroupDefinition {
        name: "administration",
        display_name: "Administration",
        permissions: &[
            (USERS_READ, "View users and their roles"),
            (USERS_WRITE, "Create users, assign roles, delete users"),
            (AUDIT_READ, "Read the audit log"),
            (KYC_REVIEW, "Review service provider KYC submissions"),
        ],
    },
    GroupDefinition {
        name: "team",
        display_name: "Team",
        permissions: &[
            (TEAM_READ, "View team members"),
            (TEAM_WRITE, "Invite and manage team members"),
        ],
    },
    GroupDefinition {
        name: "jobs",
        display_name: "Jobs",
        permissions: &[
            (JOBS_READ, "View jobs"),
            (JOBS_WRITE, "Create and edit jobs"),
            (JOBS_ACCEPT, "Accept offered jobs"),
        ],
    },
    GroupDefinition {
        name: "profile",
        display_name: "Profile",
        permissions: &[
            (PROFILE_READ, "View own profile"),
            (PROFILE_WRITE, "Edit own profile"),
        ],
    },
];

pub static SYSTEM_ROLES: &[RoleDefinition] = &[
    RoleDefinition {
        name: SUPER_ADMIN,
        display_name: "Super Admin",
        description: "Full platform administration",
        actor_type: UserType::Admin,
        parent: None,
        permissions: &[
            ROLES_READ,
            ROLES_WRITE,
            PERMISSIONS_READ,
            PERMISSIONS_WRITE,
            USERS_READ,
            USERS_WRITE,
            AUDIT_READ,
            KYC_REVIEW,
            PROFILE_READ,
            PROFILE_WRITE,
        ],
    },
    RoleDefinition {
        name: SUPPORT_ADMIN,
        display_name: "Support Admin",
        description: "Read-only support access",
        actor_type: UserType::Admin,
        parent: Some(SUPER_ADMIN),
        permissions: &[
            ROLES_READ,
            PERMISSIONS_READ,
            USERS_READ,
            AUDIT_READ,
            PROFILE_READ,
        ],
    },
    RoleDefinition {
        name: CLIENT_ADMIN,
        display_name: "Client Admin",
        description: "Owner of a client tenant",
        actor_type: UserType::Client,
        parent: None,
        permissions: &[
            TEAM_READ,
            TEAM_WRITE,
            JOBS_READ,
            JOBS_WRITE,
            PROFILE_READ,
            PROFILE_WRITE,
        ],
    },
    RoleDefinition {
        name: CLIENT_MEMBER,
        display_name: "Client Member",
        description: "Team member of a client tenant",
        actor_type: UserType::Client,
        parent: Some(CLIENT_ADMIN),
        permissions: &[TEAM_READ, JOBS_READ, PROFILE_READ, PROFILE_WRITE],
    },
    RoleDefinition {
        name: SP_BASIC,
        display_name: "Service Provider",
        description: "Default role of a service provider",
        actor_type: UserType::Sp,
        parent: None,
        permissions: &[JOBS_READ, JOBS_ACCEPT, PROFILE_READ, PROFILE_WRITE],
    },
    RoleDefinition {
        name: PARTNER_BASIC,
        display_name: "Partner",
        description: "Default role of a partner",
        actor_type: UserType::Partner,
        parent: None,
        permissions: &[JOBS_READ, PROFILE_READ],
    },
];

/// Default role granted at signup for a self-registering actor type.
pub fn signup_role(user_type: UserType) -> Option<&'static str> {
    match user_type {
        UserType::Client => Some(CLIENT_ADMIN),
        UserType::Sp => Some(SP_BASIC),
        UserType::Admin | UserType::Partner => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use workgrid_entity::role::{is_valid_permission_name, is_valid_role_name};

    use super::*;

    #[test]
    fn test_catalog_names_are_well_formed() {
        for group in PERMISSION_GROUPS {
            for (name, _) in group.permissions {
                assert!(is_valid_permission_name(name), "{name}");
            }
        }
        for role in SYSTEM_ROLES {
            assert!(is_valid_role_name(role.name), "{}", role.name);
        }
    }

    #[test]
    fn test_role_permissions_exist_in_catalog() {
        let known: HashSet<&str> = PERMISSION_GROUPS
            .iter()
            .flat_map(|g| g.permissions.iter().map(|(name, _)| *name))
            .collect();
        for role in SYSTEM_ROLES {
            for perm in role.permissions {
                assert!(known.contains(perm), "{} grants unknown {perm}", role.name);
            }
            if let Some(parent) = role.parent {
                assert!(SYSTEM_ROLES.iter().any(|r| r.name == parent));
            }
        }
    }
}
