//! # workgrid-auth
//!
//! Authentication and authorization for WorkGrid.
//!
//! ## Modules
//!
//! - `jwt`: access, refresh and role-selection token encoding/decoding
//! - `password`: Argon2id hashing and password policy
//! - `rbac`: permission catalog, live permission resolution, enforcement
//! - `session`: login, role selection, refresh rotation and logout

pub mod jwt;
pub mod password;
pub mod rbac;
pub mod session;

pub use jwt::{AccessClaims, JwtDecoder, JwtEncoder, RefreshClaims, RoleSelectionClaims, TokenPair};
pub use password::{PasswordHasher, PasswordValidator};
pub use rbac::{PermissionResolver, ResolvedAccess};
pub use session::{AuthSession, ClientInfo, LoginOutcome, LogoutReport, SessionManager};
