//! Shared account creation used by signup, admin user creation, team
//! invitations and the operator CLI.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use workgrid_auth::password::PasswordValidator;
use workgrid_auth::rbac::catalog;
use workgrid_auth::session::SessionManager;
use workgrid_core::error::AppError;
use workgrid_core::result::AppResult;
use workgrid_database::{NewAccount, NewProfile, Stores};
use workgrid_entity::role::{AssignUserRole, Role};
use workgrid_entity::user::{CreateUser, User, UserType};

/// Identity and credentials of an account to create.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserRequest {
    pub phone: String,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password: String,
    pub user_type: UserType,
    pub full_name: Option<String>,
    /// Name of the tenant to create. Required for CLIENT users that do not
    /// join an existing tenant.
    pub company_name: Option<String>,
}

/// Phone numbers are exactly ten ASCII digits.
pub fn is_valid_phone(phone: &str) -> bool {
    phone.len() == 10 && phone.bytes().all(|b| b.is_ascii_digit())
}

/// Creates a user with its tenant, profile and roles in one store call.
#[derive(Debug, Clone)]
pub struct AccountProvisioner {
    stores: Stores,
    sessions: Arc<SessionManager>,
    validator: PasswordValidator,
}

impl AccountProvisioner {
    /// Creates a new provisioner.
    pub fn new(stores: Stores, sessions: Arc<SessionManager>, validator: PasswordValidator) -> Self {
        Self {
            stores,
            sessions,
            validator,
        }
    }

    /// Creates the account.
    ///
    /// - `join_tenant` places a CLIENT user into an existing tenant instead
    ///   of creating one from `company_name`.
    /// - An empty `role_ids` grants the default role of the actor type.
    /// - CLIENT roles are scoped to the user's tenant; others are unscoped.
    pub async fn provision(
        &self,
        req: NewUserRequest,
        join_tenant: Option<Uuid>,
        role_ids: &[Uuid],
        assigned_by: Option<Uuid>,
    ) -> AppResult<User> {
        if !is_valid_phone(&req.phone) {
            return Err(AppError::validation("phone: must be exactly 10 digits"));
        }
        self.validator.validate(&req.password)?;

        let company_name = req
            .company_name
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from);

        let user_id = Uuid::new_v4();
        let (new_tenant, tenant_id) = match (req.user_type, join_tenant, company_name) {
            (UserType::Client, Some(existing), None) => {
                if self.stores.accounts.find_tenant(existing).await?.is_none() {
                    return Err(AppError::not_found(format!("Tenant {existing} not found")));
                }
                (None, Some(existing))
            }
            (UserType::Client, None, Some(company)) => {
                let id = Uuid::new_v4();
                (Some((id, company)), Some(id))
            }
            (UserType::Client, Some(_), Some(_)) => {
                return Err(AppError::validation(
                    "companyName: not allowed when joining an existing tenant",
                ));
            }
            (UserType::Client, None, None) => {
                return Err(AppError::validation(
                    "companyName: required for CLIENT users",
                ));
            }
            (_, _, Some(_)) => {
                return Err(AppError::validation(
                    "companyName: only allowed for CLIENT users",
                ));
            }
            (_, _, None) => (None, None),
        };

        let roles = self.roles_for(req.user_type, role_ids).await?;
        let assignments = roles
            .iter()
            .map(|role| AssignUserRole {
                user_id,
                role_id: role.id,
                tenant_id,
                expires_at: None,
                assigned_by_id: assigned_by,
            })
            .collect();

        let profile = match (req.user_type, tenant_id) {
            (UserType::Client, Some(tenant_id)) => NewProfile::Client {
                tenant_id,
                full_name: req.full_name,
            },
            (UserType::Sp, _) => NewProfile::Sp,
            (UserType::Admin, _) => NewProfile::Admin {
                full_name: req.full_name,
            },
            _ => NewProfile::None,
        };

        let password_hash = self.sessions.password_hasher().hash_password(&req.password)?;
        let email = req
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());

        let user = self
            .stores
            .accounts
            .create_account(NewAccount {
                user_id,
                user: CreateUser {
                    phone: req.phone,
                    email,
                    password_hash,
                    user_type: req.user_type,
                },
                tenant: new_tenant,
                profile,
                roles: assignments,
            })
            .await?;

        info!(
            user_id = %user.id,
            user_type = %user.user_type,
            tenant_id = ?tenant_id,
            roles = roles.len(),
            "Account created"
        );
        Ok(user)
    }

    /// Resolves and checks the roles to grant.
    async fn roles_for(&self, user_type: UserType, role_ids: &[Uuid]) -> AppResult<Vec<Role>> {
        if role_ids.is_empty() {
            let Some(name) = catalog::signup_role(user_type) else {
                return Ok(Vec::new());
            };
            let role = self
                .stores
                .roles
                .find_role_by_name(name)
                .await?
                .ok_or_else(|| AppError::internal(format!("System role {name} is not seeded")))?;
            return Ok(vec![role]);
        }

        let mut roles: Vec<Role> = Vec::with_capacity(role_ids.len());
        for id in role_ids {
            if roles.iter().any(|r| r.id == *id) {
                continue;
            }
            let role = self
                .stores
                .roles
                .find_role(*id)
                .await?
                .ok_or_else(|| AppError::validation(format!("roleIds: role {id} does not exist")))?;
            if role.actor_type != user_type {
                return Err(AppError::validation(format!(
                    "roleIds: role {} cannot be held by {} users",
                    role.name, user_type
                )));
            }
            if !role.is_active {
                return Err(AppError::validation(format!(
                    "roleIds: role {} is inactive",
                    role.name
                )));
            }
            roles.push(role);
        }
        Ok(roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_format() {
        assert!(is_valid_phone("9876543210"));
        assert!(!is_valid_phone("987654321"));
        assert!(!is_valid_phone("98765432101"));
        assert!(!is_valid_phone("98765x3210"));
        assert!(!is_valid_phone("+919876543"));
    }
}
