//! Role graph entities: roles, permissions, and the joins between them.

pub mod assignment;
pub mod model;
pub mod permission;

pub use assignment::{ActiveRole, AssignUserRole, RolePermission, UserRole, UserRoleView};
pub use model::{CreateRole, Role, RoleSummary, UpdateRole, is_valid_role_name};
pub use permission::{
    CreatePermission, CreatePermissionGroup, Permission, PermissionGroup, UpdatePermission,
    is_valid_permission_name,
};
