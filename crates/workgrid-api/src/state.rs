//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use workgrid_auth::{PasswordValidator, SessionManager};
use workgrid_core::config::AppConfig;
use workgrid_core::result::AppResult;
use workgrid_database::Stores;
use workgrid_service::{
    AccountProvisioner, AdminUserService, AuditService, AuthService, PermissionService,
    ProfileService, RoleService, TeamService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    pub stores: Stores,

    // ── Auth ─────────────────────────────────────────────────
    pub session_manager: Arc<SessionManager>,

    // ── Services ─────────────────────────────────────────────
    pub auth_service: Arc<AuthService>,
    pub role_service: Arc<RoleService>,
    pub permission_service: Arc<PermissionService>,
    pub admin_user_service: Arc<AdminUserService>,
    pub team_service: Arc<TeamService>,
    pub profile_service: Arc<ProfileService>,
    pub audit_service: Arc<AuditService>,
}

impl AppState {
    /// Wires the auth components and services on top of `stores`.
    pub fn new(config: AppConfig, stores: Stores) -> AppResult<Self> {
        let session_manager = Arc::new(SessionManager::new(stores.clone(), config.auth.clone())?);
        let password_validator = PasswordValidator::new(&config.auth);
        let provisioner = AccountProvisioner::new(
            stores.clone(),
            Arc::clone(&session_manager),
            password_validator,
        );
        let audit_service = AuditService::new(Arc::clone(&stores.audit));

        let auth_service = AuthService::new(
            stores.clone(),
            Arc::clone(&session_manager),
            provisioner.clone(),
        );
        let role_service = RoleService::new(stores.clone(), audit_service.clone());
        let permission_service = PermissionService::new(stores.clone(), audit_service.clone());
        let admin_user_service = AdminUserService::new(
            stores.clone(),
            Arc::clone(&session_manager),
            provisioner.clone(),
            audit_service.clone(),
        );
        let team_service = TeamService::new(stores.clone(), provisioner, audit_service.clone());
        let profile_service = ProfileService::new(stores.clone());

        Ok(Self {
            config: Arc::new(config),
            stores,
            session_manager,
            auth_service: Arc::new(auth_service),
            role_service: Arc::new(role_service),
            permission_service: Arc::new(permission_service),
            admin_user_service: Arc::new(admin_user_service),
            team_service: Arc::new(team_service),
            profile_service: Arc::new(profile_service),
            audit_service: Arc::new(audit_service),
        })
    }
}
