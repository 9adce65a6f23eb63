//! Authentication use cases on top of the session manager.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use workgrid_auth::jwt::TokenPair;
use workgrid_auth::session::{AuthSession, ClientInfo, LoginOutcome, LogoutReport, SessionManager};
use workgrid_core::error::AppError;
use workgrid_core::result::AppResult;
use workgrid_database::Stores;
use workgrid_entity::profile::Profile;
use workgrid_entity::role::RoleSummary;
use workgrid_entity::user::{User, UserType};

use crate::context::RequestContext;
use crate::user::provision::{AccountProvisioner, NewUserRequest};

/// Self-registration input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub phone: String,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password: String,
    pub user_type: UserType,
    pub full_name: Option<String>,
    pub company_name: Option<String>,
}

/// A user together with its profile and effective access.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub profile: Option<Profile>,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
    pub tenant_id: Option<Uuid>,
}

/// Tokens plus the user they were issued for.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResult {
    /// Always `false`; present so clients can branch on one field.
    pub requires_role_selection: bool,
    pub user: UserDetail,
    #[serde(flatten)]
    pub tokens: TokenPair,
    /// The admin role the tokens are scoped to, after role selection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_role: Option<RoleSummary>,
}

/// Returned to an admin holding several admin roles.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSelectionChallenge {
    /// Always `true`.
    pub requires_role_selection: bool,
    pub temp_token: String,
    pub expires_at: DateTime<Utc>,
    pub available_roles: Vec<RoleSummary>,
}

/// Either tokens or a role-selection challenge.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum LoginResult {
    Authenticated(AuthResult),
    RoleSelectionRequired(RoleSelectionChallenge),
}

/// Handles the authentication endpoints.
#[derive(Debug, Clone)]
pub struct AuthService {
    stores: Stores,
    sessions: Arc<SessionManager>,
    provisioner: AccountProvisioner,
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(stores: Stores, sessions: Arc<SessionManager>, provisioner: AccountProvisioner) -> Self {
        Self {
            stores,
            sessions,
            provisioner,
        }
    }

    /// Registers a CLIENT, SP or PARTNER and logs them in.
    pub async fn signup(&self, req: SignupRequest) -> AppResult<AuthResult> {
        if !req.user_type.allows_self_signup() {
            return Err(AppError::validation(
                "userType: ADMIN accounts cannot self-register",
            ));
        }

        let user = self
            .provisioner
            .provision(
                NewUserRequest {
                    phone: req.phone,
                    email: req.email,
                    password: req.password,
                    user_type: req.user_type,
                    full_name: req.full_name,
                    company_name: req.company_name,
                },
                None,
                &[],
                None,
            )
            .await?;

        let session = self.sessions.issue_for_user(&user).await?;
        info!(user_id = %user.id, user_type = %user.user_type, "User signed up");
        self.auth_result(session).await
    }

    /// Checks credentials and either issues tokens or asks the admin to pick
    /// a role.
    pub async fn login(
        &self,
        phone: &str,
        password: &str,
        client: ClientInfo,
    ) -> AppResult<LoginResult> {
        match self.sessions.login(phone, password, client).await? {
            LoginOutcome::Authenticated(session) => {
                Ok(LoginResult::Authenticated(self.auth_result(session).await?))
            }
            LoginOutcome::RoleSelectionRequired {
                temp_token,
                expires_at,
                available_roles,
                ..
            } => Ok(LoginResult::RoleSelectionRequired(RoleSelectionChallenge {
                requires_role_selection: true,
                temp_token,
                expires_at,
                available_roles,
            })),
        }
    }

    /// Completes a multi-role admin login.
    pub async fn select_role(
        &self,
        temp_token: &str,
        role_id: Uuid,
        client: ClientInfo,
    ) -> AppResult<AuthResult> {
        let session = self.sessions.select_role(temp_token, role_id, client).await?;
        let mut result = self.auth_result(session).await?;
        result.selected_role = self
            .stores
            .roles
            .find_role(role_id)
            .await?
            .map(|role| role.summary());
        Ok(result)
    }

    /// Rotates a refresh token.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<AuthResult> {
        let session = self.sessions.refresh(refresh_token).await?;
        self.auth_result(session).await
    }

    /// Revokes every refresh token of the caller.
    pub async fn logout(&self, ctx: &RequestContext) -> AppResult<LogoutReport> {
        self.sessions.logout(ctx.user_id).await
    }

    /// The caller, with the roles and permissions of the presented token.
    pub async fn me(&self, ctx: &RequestContext) -> AppResult<UserDetail> {
        let user = self
            .stores
            .accounts
            .find_user(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        let profile = self
            .stores
            .accounts
            .find_profile(user.id, user.user_type)
            .await?;

        Ok(UserDetail {
            user,
            profile,
            roles: ctx.roles.clone(),
            permissions: ctx.permissions.clone(),
            tenant_id: ctx.tenant_id,
        })
    }

    async fn auth_result(&self, session: AuthSession) -> AppResult<AuthResult> {
        let profile = self
            .stores
            .accounts
            .find_profile(session.user.id, session.user.user_type)
            .await?;
        let tenant_id = session
            .access
            .tenant_id
            .or_else(|| profile.as_ref().and_then(Profile::tenant_id));

        Ok(AuthResult {
            requires_role_selection: false,
            user: UserDetail {
                user: session.user,
                profile,
                roles: session.access.roles,
                permissions: session.access.permissions,
                tenant_id,
            },
            tokens: session.tokens,
            selected_role: None,
        })
    }
}
