//! Session lifecycle manager: login, role selection, refresh rotation, logout.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use workgrid_core::config::AuthConfig;
use workgrid_core::error::AppError;
use workgrid_core::result::AppResult;
use workgrid_database::Stores;
use workgrid_entity::profile::Profile;
use workgrid_entity::role::{Role, RoleSummary};
use workgrid_entity::session::{CreateAdminSession, CreateRefreshToken};
use workgrid_entity::user::User;

use super::token_hash::hash_token;
use crate::jwt::{JwtDecoder, JwtEncoder, TokenPair};
use crate::password::PasswordHasher;
use crate::rbac::{PermissionResolver, ResolvedAccess};

const INVALID_CREDENTIALS: &str = "Invalid phone or password";
const INVALID_REFRESH: &str = "Invalid or expired refresh token";

/// Where a request came from, recorded on admin sessions.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// A fully authenticated principal with a fresh token pair.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub access: ResolvedAccess,
    pub tokens: TokenPair,
    /// Admin session id, for admins only.
    pub session_id: Option<Uuid>,
}

/// Result of a successful credential check.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    /// Tokens were issued.
    Authenticated(AuthSession),
    /// The admin holds more than one admin role and must pick one.
    RoleSelectionRequired {
        user: User,
        temp_token: String,
        expires_at: DateTime<Utc>,
        available_roles: Vec<RoleSummary>,
    },
}

/// What a logout revoked.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutReport {
    pub revoked_tokens: u64,
    pub terminated_sessions: u64,
}

/// Manages the complete session lifecycle.
#[derive(Clone)]
pub struct SessionManager {
    stores: Stores,
    /// JWT encoder for token generation.
    jwt_encoder: Arc<JwtEncoder>,
    /// JWT decoder for token validation.
    jwt_decoder: Arc<JwtDecoder>,
    /// Password hasher.
    password_hasher: Arc<PasswordHasher>,
    resolver: PermissionResolver,
    /// Auth configuration.
    auth_config: AuthConfig,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("revoke_family_on_reuse", &self.auth_config.revoke_family_on_reuse)
            .field(
                "terminate_other_admin_sessions",
                &self.auth_config.terminate_other_admin_sessions,
            )
            .finish()
    }
}

impl SessionManager {
    /// Creates a session manager, building the token and password components
    /// from `auth_config`.
    pub fn new(stores: Stores, auth_config: AuthConfig) -> AppResult<Self> {
        Ok(Self {
            jwt_encoder: Arc::new(JwtEncoder::new(&auth_config)),
            jwt_decoder: Arc::new(JwtDecoder::new(&auth_config)),
            password_hasher: Arc::new(PasswordHasher::new(&auth_config)?),
            resolver: PermissionResolver::new(stores.roles.clone()),
            stores,
            auth_config,
        })
    }

    /// Decoder shared with request authentication.
    pub fn decoder(&self) -> &JwtDecoder {
        &self.jwt_decoder
    }

    /// Hasher shared with account creation.
    pub fn password_hasher(&self) -> &PasswordHasher {
        &self.password_hasher
    }

    /// Live permission resolver.
    pub fn resolver(&self) -> &PermissionResolver {
        &self.resolver
    }

    /// Performs the login flow:
    ///
    /// 1. Find the non-deleted user by phone
    /// 2. Verify the password (a dummy verify runs on a miss)
    /// 3. Reject inactive or suspended accounts
    /// 4. Resolve active roles; admins go through role selection
    /// 5. Record `last_login_at` and issue tokens
    pub async fn login(
        &self,
        phone: &str,
        password: &str,
        client: ClientInfo,
    ) -> AppResult<LoginOutcome> {
        let Some(user) = self.stores.accounts.find_user_by_phone(phone).await? else {
            self.password_hasher.verify_dummy(password);
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        if !self
            .password_hasher
            .verify_password(password, &user.password_hash)?
        {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        if !user.can_login() {
            warn!(user_id = %user.id, status = ?user.status, "Login refused for inactive account");
            return Err(AppError::forbidden("Account is not active"));
        }

        let outcome = if user.user_type.is_admin() {
            self.admin_login(user, client).await?
        } else {
            LoginOutcome::Authenticated(self.issue_for_user(&user).await?)
        };

        let user_id = match &outcome {
            LoginOutcome::Authenticated(session) => session.user.id,
            LoginOutcome::RoleSelectionRequired { user, .. } => user.id,
        };
        self.stores
            .accounts
            .touch_last_login(user_id, Utc::now())
            .await?;

        info!(user_id = %user_id, "Login succeeded");
        Ok(outcome)
    }

    async fn admin_login(&self, user: User, client: ClientInfo) -> AppResult<LoginOutcome> {
        let mut roles = self.resolver.admin_roles(user.id).await?;

        match roles.len() {
            0 => {
                warn!(user_id = %user.id, "Admin login refused: no active admin role");
                Err(AppError::forbidden("No active admin role assigned"))
            }
            1 => {
                let role = roles.remove(0);
                let session = self.start_admin_session(user, &role, client).await?;
                Ok(LoginOutcome::Authenticated(session))
            }
            _ => {
                let (temp_token, expires_at) = self.jwt_encoder.issue_role_selection(user.id)?;
                info!(user_id = %user.id, candidates = roles.len(), "Admin must select a role");
                Ok(LoginOutcome::RoleSelectionRequired {
                    user,
                    temp_token,
                    expires_at,
                    available_roles: roles.iter().map(Role::summary).collect(),
                })
            }
        }
    }

    /// Completes a multi-role admin login with the chosen role.
    pub async fn select_role(
        &self,
        temp_token: &str,
        role_id: Uuid,
        client: ClientInfo,
    ) -> AppResult<AuthSession> {
        let claims = self.jwt_decoder.decode_role_selection_token(temp_token)?;

        let user = self
            .stores
            .accounts
            .find_user(claims.sub)
            .await?
            .ok_or_else(|| AppError::unauthorized("User no longer exists"))?;

        if !user.user_type.is_admin() {
            return Err(AppError::forbidden("Role selection is only available to admins"));
        }
        if !user.can_login() {
            return Err(AppError::forbidden("Account is not active"));
        }

        let role = self
            .resolver
            .admin_roles(user.id)
            .await?
            .into_iter()
            .find(|r| r.id == role_id)
            .ok_or_else(|| AppError::forbidden("Role is not one of your active admin roles"))?;

        self.start_admin_session(user, &role, client).await
    }

    async fn start_admin_session(
        &self,
        user: User,
        role: &Role,
        client: ClientInfo,
    ) -> AppResult<AuthSession> {
        self.stores
            .accounts
            .set_admin_active_role(user.id, Some(role.id))
            .await?;

        let session = self
            .stores
            .tokens
            .create_admin_session(CreateAdminSession {
                user_id: user.id,
                role_id: role.id,
                ip_address: client.ip_address,
                user_agent: client.user_agent,
            })
            .await?;

        if self.auth_config.terminate_other_admin_sessions {
            let terminated = self
                .stores
                .tokens
                .terminate_admin_sessions(user.id, Some(session.id), "superseded")
                .await?;
            if terminated > 0 {
                info!(user_id = %user.id, terminated, "Terminated previous admin sessions");
            }
        }

        let access = self.resolver.resolve_for_role(role).await?;
        let tokens = self
            .persist_pair(&user, &access, Uuid::new_v4(), Some(session.id))
            .await?;

        info!(user_id = %user.id, role = %role.name, session_id = %session.id, "Admin session started");
        Ok(AuthSession {
            user,
            access,
            tokens,
            session_id: Some(session.id),
        })
    }

    /// Issues a pair in a new family for a non-admin user, from live roles.
    pub async fn issue_for_user(&self, user: &User) -> AppResult<AuthSession> {
        let access = self.resolver.resolve_user(user.id).await?;
        let tokens = self
            .persist_pair(user, &access, Uuid::new_v4(), None)
            .await?;
        Ok(AuthSession {
            user: user.clone(),
            access,
            tokens,
            session_id: None,
        })
    }

    async fn persist_pair(
        &self,
        user: &User,
        access: &ResolvedAccess,
        family_id: Uuid,
        session_id: Option<Uuid>,
    ) -> AppResult<TokenPair> {
        let issued = self
            .jwt_encoder
            .issue_pair(user.id, user.user_type, access, family_id, session_id)?;

        self.stores
            .tokens
            .store_refresh_token(CreateRefreshToken {
                id: issued.refresh_id,
                user_id: user.id,
                token_hash: hash_token(&issued.pair.refresh_token),
                family_id: issued.family_id,
                expires_at: issued.pair.refresh_expires_at,
            })
            .await?;

        Ok(issued.pair)
    }

    /// Rotates a refresh token: the presented token is revoked and a new pair
    /// in the same family is issued. A token can be rotated exactly once.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<AuthSession> {
        let claims = self.jwt_decoder.decode_refresh_token(refresh_token)?;

        let record = self
            .stores
            .tokens
            .find_refresh_token(&hash_token(refresh_token))
            .await?
            .filter(|r| r.user_id == claims.sub)
            .ok_or_else(|| AppError::unauthorized(INVALID_REFRESH))?;

        if record.revoked_at.is_some() {
            return Err(self.reused_token(record.user_id, record.family_id).await);
        }
        if record.expires_at <= Utc::now() {
            return Err(AppError::unauthorized(INVALID_REFRESH));
        }

        if !self.stores.tokens.revoke_refresh_token(record.id).await? {
            // Lost a race against a concurrent rotation of the same token.
            return Err(self.reused_token(record.user_id, record.family_id).await);
        }

        let user = self
            .stores
            .accounts
            .find_user(record.user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("User no longer exists"))?;
        if !user.can_login() {
            return Err(AppError::forbidden("Account is not active"));
        }

        let access = if user.user_type.is_admin() {
            self.admin_refresh_access(&user, claims.sid).await?
        } else {
            self.resolver.resolve_user(user.id).await?
        };

        let tokens = self
            .persist_pair(&user, &access, record.family_id, claims.sid)
            .await?;

        info!(user_id = %user.id, family_id = %record.family_id, "Refresh token rotated");
        Ok(AuthSession {
            user,
            access,
            tokens,
            session_id: claims.sid,
        })
    }

    /// Access for an admin refresh: the stored active role only, and only
    /// while it is still active and assigned and the session is live.
    async fn admin_refresh_access(
        &self,
        user: &User,
        session_id: Option<Uuid>,
    ) -> AppResult<ResolvedAccess> {
        if let Some(sid) = session_id {
            self.validate_admin_session(sid).await?;
        }

        let active_role_id = match self
            .stores
            .accounts
            .find_profile(user.id, user.user_type)
            .await?
        {
            Some(Profile::Admin(profile)) => profile.active_role_id,
            _ => None,
        }
        .ok_or_else(|| AppError::unauthorized("No admin role selected"))?;

        let role = self
            .resolver
            .admin_roles(user.id)
            .await?
            .into_iter()
            .find(|r| r.id == active_role_id)
            .ok_or_else(|| AppError::unauthorized("Selected admin role is no longer active"))?;

        self.resolver.resolve_for_role(&role).await
    }

    async fn reused_token(&self, user_id: Uuid, family_id: Uuid) -> AppError {
        warn!(user_id = %user_id, family_id = %family_id, "Revoked refresh token presented");
        if self.auth_config.revoke_family_on_reuse {
            match self.stores.tokens.revoke_token_family(family_id).await {
                Ok(revoked) => {
                    warn!(family_id = %family_id, revoked, "Revoked refresh token family")
                }
                Err(e) => return e,
            }
        }
        AppError::unauthorized(INVALID_REFRESH)
    }

    /// Revokes every refresh token of the user and ends their admin sessions.
    /// Calling it again is harmless.
    pub async fn logout(&self, user_id: Uuid) -> AppResult<LogoutReport> {
        let report = self.end_all_sessions(user_id, "logout").await?;
        info!(
            user_id = %user_id,
            revoked_tokens = report.revoked_tokens,
            terminated_sessions = report.terminated_sessions,
            "User logged out"
        );
        Ok(report)
    }

    /// Logs a user out everywhere on someone else's behalf.
    pub async fn force_logout(&self, user_id: Uuid, reason: &str) -> AppResult<LogoutReport> {
        let report = self.end_all_sessions(user_id, reason).await?;
        warn!(user_id = %user_id, reason, "User force-logged out");
        Ok(report)
    }

    async fn end_all_sessions(&self, user_id: Uuid, reason: &str) -> AppResult<LogoutReport> {
        let revoked_tokens = self
            .stores
            .tokens
            .revoke_user_refresh_tokens(user_id)
            .await?;
        let terminated_sessions = self
            .stores
            .tokens
            .terminate_admin_sessions(user_id, None, reason)
            .await?;
        Ok(LogoutReport {
            revoked_tokens,
            terminated_sessions,
        })
    }

    /// Fails with `Unauthorized` unless the admin session exists and is live.
    pub async fn validate_admin_session(&self, session_id: Uuid) -> AppResult<()> {
        match self.stores.tokens.find_admin_session(session_id).await? {
            Some(session) if session.is_active() => Ok(()),
            _ => Err(AppError::unauthorized("Session has been terminated")),
        }
    }
}

#[cfg(test)]
mod tests {
    use workgrid_core::error::ErrorKind;
    use workgrid_database::{NewAccount, NewProfile};
    use workgrid_entity::role::{AssignUserRole, CreatePermission, CreateRole};
    use workgrid_entity::user::{CreateUser, UserType};

    use super::*;

    const PASSWORD: &str = "Secret123";

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "session-test-secret-0123456789".into(),
            argon2_memory_kib: 1024,
            argon2_iterations: 1,
            ..AuthConfig::default()
        }
    }

    async fn admin_role(stores: &Stores, name: &str, perm: &str) -> Role {
        let role = stores
            .roles
            .create_role(CreateRole {
                name: name.into(),
                display_name: name.into(),
                description: None,
                actor_type: UserType::Admin,
                is_system: false,
                parent_id: None,
            })
            .await
            .unwrap();
        let permission = stores
            .roles
            .create_permission(CreatePermission {
                name: perm.into(),
                description: None,
                group_id: None,
            })
            .await
            .unwrap();
        stores
            .roles
            .assign_permissions(role.id, &[permission.id], None)
            .await
            .unwrap();
        role
    }

    async fn account(
        manager: &SessionManager,
        stores: &Stores,
        phone: &str,
        user_type: UserType,
        roles: &[&Role],
    ) -> Uuid {
        let user_id = Uuid::new_v4();
        let profile = match user_type {
            UserType::Admin => NewProfile::Admin { full_name: None },
            UserType::Sp => NewProfile::Sp,
            _ => NewProfile::None,
        };
        stores
            .accounts
            .create_account(NewAccount {
                user_id,
                user: CreateUser {
                    phone: phone.into(),
                    email: None,
                    password_hash: manager.password_hasher().hash_password(PASSWORD).unwrap(),
                    user_type,
                },
                tenant: None,
                profile,
                roles: roles
                    .iter()
                    .map(|r| AssignUserRole {
                        user_id,
                        role_id: r.id,
                        tenant_id: None,
                        expires_at: None,
                        assigned_by_id: None,
                    })
                    .collect(),
            })
            .await
            .unwrap();
        user_id
    }

    fn setup() -> (Stores, SessionManager) {
        let stores = Stores::memory();
        let manager = SessionManager::new(stores.clone(), config()).unwrap();
        (stores, manager)
    }

    fn authenticated(outcome: LoginOutcome) -> AuthSession {
        match outcome {
            LoginOutcome::Authenticated(session) => session,
            other => panic!("expected tokens, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_phone() {
        let (stores, manager) = setup();
        let user_id = account(&manager, &stores, "9000000001", UserType::Sp, &[]).await;

        let err = manager
            .login("9000000001", "Wrong1234", ClientInfo::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);

        let err = manager
            .login("9999999999", PASSWORD, ClientInfo::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);

        let user = stores.accounts.find_user(user_id).await.unwrap().unwrap();
        assert!(user.last_login_at.is_none());
    }

    #[tokio::test]
    async fn test_single_admin_role_logs_in_directly() {
        let (stores, manager) = setup();
        let role = admin_role(&stores, "SUPER_ADMIN", "roles:write").await;
        let user_id = account(&manager, &stores, "9000000002", UserType::Admin, &[&role]).await;

        let session = authenticated(
            manager
                .login("9000000002", PASSWORD, ClientInfo::default())
                .await
                .unwrap(),
        );
        assert_eq!(session.access.roles, vec!["SUPER_ADMIN"]);
        assert_eq!(session.access.permissions, vec!["roles:write"]);
        assert!(session.session_id.is_some());

        let user = stores.accounts.find_user(user_id).await.unwrap().unwrap();
        assert!(user.last_login_at.is_some());
    }

    #[tokio::test]
    async fn test_multi_role_admin_selects_role() {
        let (stores, manager) = setup();
        let a = admin_role(&stores, "SUPER_ADMIN", "roles:write").await;
        let b = admin_role(&stores, "SUPPORT_ADMIN", "audit:read").await;
        let outsider = admin_role(&stores, "OTHER_ADMIN", "users:write").await;
        account(&manager, &stores, "9000000003", UserType::Admin, &[&a, &b]).await;

        let outcome = manager
            .login("9000000003", PASSWORD, ClientInfo::default())
            .await
            .unwrap();
        let LoginOutcome::RoleSelectionRequired {
            temp_token,
            available_roles,
            ..
        } = outcome
        else {
            panic!("expected role selection");
        };
        let names: Vec<_> = available_roles.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["SUPER_ADMIN", "SUPPORT_ADMIN"]);

        let err = manager
            .select_role(&temp_token, outsider.id, ClientInfo::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);

        let session = manager
            .select_role(&temp_token, b.id, ClientInfo::default())
            .await
            .unwrap();
        assert_eq!(session.access.roles, vec!["SUPPORT_ADMIN"]);
        assert_eq!(session.access.permissions, vec!["audit:read"]);

        let refreshed = manager.refresh(&session.tokens.refresh_token).await.unwrap();
        assert_eq!(refreshed.access.roles, vec!["SUPPORT_ADMIN"]);
        assert_eq!(refreshed.session_id, session.session_id);
    }

    #[tokio::test]
    async fn test_admin_without_role_forbidden() {
        let (stores, manager) = setup();
        account(&manager, &stores, "9000000004", UserType::Admin, &[]).await;
        let err = manager
            .login("9000000004", PASSWORD, ClientInfo::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_refresh_rotation_single_use() {
        let (stores, manager) = setup();
        account(&manager, &stores, "9000000005", UserType::Sp, &[]).await;
        let session = authenticated(
            manager
                .login("9000000005", PASSWORD, ClientInfo::default())
                .await
                .unwrap(),
        );

        let rotated = manager.refresh(&session.tokens.refresh_token).await.unwrap();
        assert_ne!(rotated.tokens.refresh_token, session.tokens.refresh_token);

        let err = manager
            .refresh(&session.tokens.refresh_token)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);

        // Family revocation is off by default.
        assert!(manager.refresh(&rotated.tokens.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_reuse_revokes_family_when_enabled() {
        let stores = Stores::memory();
        let manager = SessionManager::new(
            stores.clone(),
            AuthConfig {
                revoke_family_on_reuse: true,
                ..config()
            },
        )
        .unwrap();
        account(&manager, &stores, "9000000006", UserType::Sp, &[]).await;
        let session = authenticated(
            manager
                .login("9000000006", PASSWORD, ClientInfo::default())
                .await
                .unwrap(),
        );
        let rotated = manager.refresh(&session.tokens.refresh_token).await.unwrap();

        assert!(manager.refresh(&session.tokens.refresh_token).await.is_err());
        assert!(manager.refresh(&rotated.tokens.refresh_token).await.is_err());
    }

    #[tokio::test]
    async fn test_logout_revokes_every_refresh_token() {
        let (stores, manager) = setup();
        let user_id = account(&manager, &stores, "9000000007", UserType::Sp, &[]).await;
        let first = authenticated(
            manager
                .login("9000000007", PASSWORD, ClientInfo::default())
                .await
                .unwrap(),
        );
        let second = authenticated(
            manager
                .login("9000000007", PASSWORD, ClientInfo::default())
                .await
                .unwrap(),
        );

        let report = manager.logout(user_id).await.unwrap();
        assert_eq!(report.revoked_tokens, 2);
        assert!(manager.refresh(&first.tokens.refresh_token).await.is_err());
        assert!(manager.refresh(&second.tokens.refresh_token).await.is_err());

        let again = manager.logout(user_id).await.unwrap();
        assert_eq!(again.revoked_tokens, 0);
    }
}
