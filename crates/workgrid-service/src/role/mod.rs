//! Role graph management: roles, their permissions, and the permission catalog.

pub mod permission;
pub mod service;

pub use permission::{
    CreatePermissionGroupRequest, CreatePermissionRequest, PermissionService,
    UpdatePermissionRequest,
};
pub use service::{CreateRoleRequest, RoleDetail, RoleService, UpdateRoleRequest};
