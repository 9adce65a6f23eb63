//! Role-based access control: the seeded catalog, live resolution of a
//! user's permissions, and enforcement checks.

pub mod catalog;
pub mod enforcer;
pub mod resolver;

pub use enforcer::{require_any_permission, require_permission};
pub use resolver::{PermissionResolver, ResolvedAccess};
