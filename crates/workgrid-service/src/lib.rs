//! # workgrid-service
//!
//! Business logic service layer for WorkGrid. Each service orchestrates the
//! stores and the auth components to implement one group of use cases.
//!
//! Services follow constructor injection: all dependencies are provided at
//! construction time via `Arc` references.

pub mod audit;
pub mod auth;
pub mod context;
pub mod profile;
pub mod role;
pub mod seed;
pub mod user;

pub use audit::AuditService;
pub use auth::AuthService;
pub use context::RequestContext;
pub use profile::ProfileService;
pub use role::{PermissionService, RoleService};
pub use seed::{SeedReport, seed_catalog};
pub use user::{AccountProvisioner, AdminUserService, TeamService};
