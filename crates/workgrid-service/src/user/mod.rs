//! Account creation, admin user management and client team management.

pub mod admin;
pub mod provision;
pub mod team;

pub use admin::{AdminUserService, AdminUserView, AssignRoleRequest};
pub use provision::{AccountProvisioner, NewUserRequest, is_valid_phone};
pub use team::{CreateTeamMemberRequest, TeamService};
