//! Store traits consumed by the service layer, and the [`Stores`] bundle
//! that picks an implementation per `database.provider`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use workgrid_core::config::{DatabaseConfig, DatabaseProvider};
use workgrid_core::result::AppResult;
use workgrid_core::types::pagination::PageRequest;
use workgrid_entity::audit::{AuditFilter, AuditLogEntry, CreateAuditLogEntry};
use workgrid_entity::profile::{Profile, SpProfile};
use workgrid_entity::role::{
    ActiveRole, AssignUserRole, CreatePermission, CreatePermissionGroup, CreateRole, Permission,
    PermissionGroup, Role, UpdatePermission, UpdateRole, UserRole, UserRoleView,
};
use workgrid_entity::session::{
    AdminSession, CreateAdminSession, CreateRefreshToken, RefreshTokenRecord,
};
use workgrid_entity::tenant::Tenant;
use workgrid_entity::user::{CreateUser, User, UserStatus, UserType};

use crate::connection::DatabasePool;
use crate::memory::MemoryStore;
use crate::repositories::{
    PgAccountRepository, PgAuditRepository, PgRoleRepository, PgTokenRepository,
};

/// Profile row created together with a user.
#[derive(Debug, Clone)]
pub enum NewProfile {
    /// CLIENT profile bound to a tenant, either existing or created in the
    /// same call.
    Client {
        tenant_id: Uuid,
        full_name: Option<String>,
    },
    /// SP profile starting at `PROFILE_INCOMPLETE`.
    Sp,
    /// ADMIN profile.
    Admin { full_name: Option<String> },
    /// No profile (PARTNER).
    None,
}

/// Everything written by a signup or an admin team-member creation.
///
/// Ids are generated by the caller so that role assignments can reference the
/// tenant before it exists. Implementations must write all of it or nothing.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub user_id: Uuid,
    pub user: CreateUser,
    /// `(tenant_id, company_name)` of a tenant to create, for CLIENT signups.
    pub tenant: Option<(Uuid, String)>,
    pub profile: NewProfile,
    pub roles: Vec<AssignUserRole>,
}

/// Filters for user listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFilter {
    pub user_type: Option<UserType>,
    pub status: Option<UserStatus>,
}

/// Filters for role listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleFilter {
    pub actor_type: Option<UserType>,
    pub is_active: Option<bool>,
}

/// Users, tenants and profiles.
#[async_trait]
pub trait AccountStore: Send + Sync + std::fmt::Debug {
    /// Create the user, optional tenant, profile and role assignments atomically.
    async fn create_account(&self, account: NewAccount) -> AppResult<User>;

    /// Find a non-deleted user by id.
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a non-deleted user by phone.
    async fn find_user_by_phone(&self, phone: &str) -> AppResult<Option<User>>;

    /// Record a successful login.
    async fn touch_last_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()>;

    /// Soft-delete a user. Returns `false` if the user was missing or already deleted.
    async fn soft_delete_user(&self, id: Uuid) -> AppResult<bool>;

    /// Page through non-deleted users, newest first.
    async fn list_users(&self, filter: &UserFilter, page: PageRequest)
    -> AppResult<(Vec<User>, u64)>;

    /// Load whichever profile matches the user's type.
    async fn find_profile(&self, user_id: Uuid, user_type: UserType) -> AppResult<Option<Profile>>;

    /// Load an SP profile.
    async fn find_sp_profile(&self, user_id: Uuid) -> AppResult<Option<SpProfile>>;

    /// Persist every field of an SP profile.
    async fn save_sp_profile(&self, profile: &SpProfile) -> AppResult<()>;

    /// Record the role an admin is currently acting as.
    async fn set_admin_active_role(&self, user_id: Uuid, role_id: Option<Uuid>) -> AppResult<()>;

    async fn find_tenant(&self, id: Uuid) -> AppResult<Option<Tenant>>;

    /// Number of tenants, for operator statistics.
    async fn count_tenants(&self) -> AppResult<u64>;
}

/// Roles, permissions, groups and assignments.
#[async_trait]
pub trait RoleStore: Send + Sync + std::fmt::Debug {
    async fn create_role(&self, role: CreateRole) -> AppResult<Role>;
    async fn find_role(&self, id: Uuid) -> AppResult<Option<Role>>;
    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>>;
    async fn list_roles(&self, filter: &RoleFilter, page: PageRequest)
    -> AppResult<(Vec<Role>, u64)>;
    async fn update_role(&self, id: Uuid, update: UpdateRole) -> AppResult<Option<Role>>;
    /// Hard-delete a role with its permission links and (inactive) assignments.
    async fn delete_role(&self, id: Uuid) -> AppResult<bool>;
    /// Number of active, unexpired assignments of a role.
    async fn count_active_assignments(&self, role_id: Uuid) -> AppResult<u64>;

    async fn create_permission(&self, permission: CreatePermission) -> AppResult<Permission>;
    async fn find_permission(&self, id: Uuid) -> AppResult<Option<Permission>>;
    async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<Permission>>;
    async fn list_permissions(
        &self,
        group_id: Option<Uuid>,
        page: PageRequest,
    ) -> AppResult<(Vec<Permission>, u64)>;
    async fn update_permission(
        &self,
        id: Uuid,
        update: UpdatePermission,
    ) -> AppResult<Option<Permission>>;
    async fn delete_permission(&self, id: Uuid) -> AppResult<bool>;

    async fn create_permission_group(
        &self,
        group: CreatePermissionGroup,
    ) -> AppResult<PermissionGroup>;
    async fn find_permission_group(&self, id: Uuid) -> AppResult<Option<PermissionGroup>>;
    async fn find_permission_group_by_name(&self, name: &str)
    -> AppResult<Option<PermissionGroup>>;
    async fn list_permission_groups(&self) -> AppResult<Vec<PermissionGroup>>;

    /// Permissions granted directly to a role, by name.
    async fn role_permissions(&self, role_id: Uuid) -> AppResult<Vec<Permission>>;
    /// Link permissions to a role. Returns how many links were newly created.
    async fn assign_permissions(
        &self,
        role_id: Uuid,
        permission_ids: &[Uuid],
        granted_by: Option<Uuid>,
    ) -> AppResult<u64>;
    /// Unlink permissions from a role. Returns how many links were removed.
    async fn revoke_permissions(&self, role_id: Uuid, permission_ids: &[Uuid]) -> AppResult<u64>;
    /// Distinct permission names granted to any of `role_ids`, sorted.
    async fn permission_names_for_roles(&self, role_ids: &[Uuid]) -> AppResult<Vec<String>>;

    /// Assign a role to a user, reviving an inactive or expired assignment of
    /// the same scope. Fails with `Conflict` if it is already in effect.
    async fn assign_user_role(&self, assignment: AssignUserRole) -> AppResult<UserRole>;
    /// Deactivate an assignment. Returns `false` if none was in effect.
    async fn revoke_user_role(
        &self,
        user_id: Uuid,
        role_id: Uuid,
        tenant_id: Option<Uuid>,
    ) -> AppResult<bool>;
    /// Every assignment of a user, effective or not.
    async fn list_user_roles(&self, user_id: Uuid) -> AppResult<Vec<UserRoleView>>;
    /// Active roles behind active, unexpired assignments at `now`, ordered by name.
    async fn active_roles_for_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<ActiveRole>>;
}

/// Refresh tokens and admin sessions.
#[async_trait]
pub trait TokenStore: Send + Sync + std::fmt::Debug {
    async fn store_refresh_token(&self, token: CreateRefreshToken) -> AppResult<()>;
    async fn find_refresh_token(&self, token_hash: &str) -> AppResult<Option<RefreshTokenRecord>>;
    /// Revoke one token if it is still live. Returns `true` only for the caller
    /// that actually flipped it, so concurrent rotations of the same token
    /// cannot both succeed.
    async fn revoke_refresh_token(&self, id: Uuid) -> AppResult<bool>;
    async fn revoke_user_refresh_tokens(&self, user_id: Uuid) -> AppResult<u64>;
    async fn revoke_token_family(&self, family_id: Uuid) -> AppResult<u64>;

    async fn create_admin_session(&self, session: CreateAdminSession) -> AppResult<AdminSession>;
    async fn find_admin_session(&self, id: Uuid) -> AppResult<Option<AdminSession>>;
    /// Terminate every live session of a user except `except`.
    async fn terminate_admin_sessions(
        &self,
        user_id: Uuid,
        except: Option<Uuid>,
        reason: &str,
    ) -> AppResult<u64>;
}

/// Append-only audit trail.
#[async_trait]
pub trait AuditStore: Send + Sync + std::fmt::Debug {
    async fn append(&self, entry: CreateAuditLogEntry) -> AppResult<AuditLogEntry>;
    /// Matching entries, newest first.
    async fn search(
        &self,
        filter: &AuditFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<AuditLogEntry>, u64)>;
}

/// All stores behind one handle.
#[derive(Debug, Clone)]
pub struct Stores {
    pub accounts: Arc<dyn AccountStore>,
    pub roles: Arc<dyn RoleStore>,
    pub tokens: Arc<dyn TokenStore>,
    pub audit: Arc<dyn AuditStore>,
    pool: Option<DatabasePool>,
}

impl Stores {
    /// Connect to whichever backend `config.provider` names.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        match config.provider {
            DatabaseProvider::Postgres => {
                let pool = DatabasePool::connect(config).await?;
                if config.migrate_on_startup {
                    crate::migration::run_migrations(pool.pool()).await?;
                }
                Ok(Self::postgres(pool))
            }
            DatabaseProvider::Memory => {
                info!("Using in-memory store; data will not survive a restart");
                Ok(Self::memory())
            }
        }
    }

    /// Repositories over a PostgreSQL pool.
    pub fn postgres(pool: DatabasePool) -> Self {
        let pg = pool.pool().clone();
        Self {
            accounts: Arc::new(PgAccountRepository::new(pg.clone())),
            roles: Arc::new(PgRoleRepository::new(pg.clone())),
            tokens: Arc::new(PgTokenRepository::new(pg.clone())),
            audit: Arc::new(PgAuditRepository::new(pg)),
            pool: Some(pool),
        }
    }

    /// One shared [`MemoryStore`] serving every trait.
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            accounts: store.clone(),
            roles: store.clone(),
            tokens: store.clone(),
            audit: store,
            pool: None,
        }
    }

    /// Name of the active backend, for logs and health output.
    pub fn provider(&self) -> DatabaseProvider {
        if self.pool.is_some() {
            DatabaseProvider::Postgres
        } else {
            DatabaseProvider::Memory
        }
    }

    /// Whether the backend is reachable.
    pub async fn health_check(&self) -> AppResult<bool> {
        match &self.pool {
            Some(pool) => pool.health_check().await,
            None => Ok(true),
        }
    }
}
