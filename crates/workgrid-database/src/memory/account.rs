use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use workgrid_core::error::AppError;
use workgrid_core::result::AppResult;
use workgrid_core::types::pagination::PageRequest;
use workgrid_entity::profile::{AdminProfile, ClientProfile, Profile, SpProfile};
use workgrid_entity::role::UserRole;
use workgrid_entity::tenant::Tenant;
use workgrid_entity::user::{User, UserStatus, UserType};

use super::{MemoryStore, paginate};
use crate::store::{AccountStore, NewAccount, NewProfile, UserFilter};

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_account(&self, account: NewAccount) -> AppResult<User> {
        let mut state = self.state.write().await;

        // Validate everything before the first insert so a failure leaves no rows.
        if state.users.values().any(|u| u.phone == account.user.phone) {
            return Err(AppError::conflict("Phone number already registered"));
        }
        if let Some(email) = &account.user.email {
            let taken = state.users.values().any(|u| {
                u.email
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(email))
            });
            if taken {
                return Err(AppError::conflict("Email already registered"));
            }
        }
        if state.users.contains_key(&account.user_id) {
            return Err(AppError::conflict("Resource already exists"));
        }
        if let NewProfile::Client { tenant_id, .. } = &account.profile {
            let created_here = account.tenant.as_ref().is_some_and(|(id, _)| id == tenant_id);
            if !created_here && !state.tenants.contains_key(tenant_id) {
                return Err(AppError::validation("Referenced record does not exist"));
            }
        }
        for assignment in &account.roles {
            if !state.roles.contains_key(&assignment.role_id) {
                return Err(AppError::validation("Referenced record does not exist"));
            }
        }

        let now = Utc::now();
        let user = User {
            id: account.user_id,
            phone: account.user.phone,
            email: account.user.email,
            password_hash: account.user.password_hash,
            user_type: account.user.user_type,
            status: UserStatus::Active,
            is_phone_verified: false,
            is_email_verified: false,
            last_login_at: None,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());

        if let Some((tenant_id, company_name)) = &account.tenant {
            state.tenants.insert(
                *tenant_id,
                Tenant {
                    id: *tenant_id,
                    company_name: company_name.clone(),
                    created_at: now,
                },
            );
        }

        match account.profile {
            NewProfile::Client {
                tenant_id,
                full_name,
            } => {
                state.client_profiles.insert(
                    user.id,
                    ClientProfile {
                        user_id: user.id,
                        tenant_id,
                        full_name,
                        created_at: now,
                    },
                );
            }
            NewProfile::Sp => {
                state.sp_profiles.insert(user.id, SpProfile::new(user.id));
            }
            NewProfile::Admin { full_name } => {
                state.admin_profiles.insert(
                    user.id,
                    AdminProfile {
                        user_id: user.id,
                        full_name,
                        active_role_id: None,
                        created_at: now,
                    },
                );
            }
            NewProfile::None => {}
        }

        for assignment in account.roles {
            let id = Uuid::new_v4();
            state.user_roles.insert(
                id,
                UserRole {
                    id,
                    user_id: assignment.user_id,
                    role_id: assignment.role_id,
                    tenant_id: assignment.tenant_id,
                    is_active: true,
                    expires_at: assignment.expires_at,
                    assigned_by_id: assignment.assigned_by_id,
                    created_at: now,
                },
            );
        }

        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.get(&id).filter(|u| !u.is_deleted()).cloned())
    }

    async fn find_user_by_phone(&self, phone: &str) -> AppResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| u.phone == phone && !u.is_deleted())
            .cloned())
    }

    async fn touch_last_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        let mut state = self.state.write().await;
        if let Some(user) = state.users.get_mut(&id) {
            user.last_login_at = Some(at);
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn soft_delete_user(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        match state.users.get_mut(&id) {
            Some(user) if !user.is_deleted() => {
                let now = Utc::now();
                user.deleted_at = Some(now);
                user.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_users(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<User>, u64)> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state
            .users
            .values()
            .filter(|u| !u.is_deleted())
            .filter(|u| filter.user_type.is_none_or(|t| u.user_type == t))
            .filter(|u| filter.status.is_none_or(|s| u.status == s))
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(users, page))
    }

    async fn find_profile(&self, user_id: Uuid, user_type: UserType) -> AppResult<Option<Profile>> {
        let state = self.state.read().await;
        let profile = match user_type {
            UserType::Client => state.client_profiles.get(&user_id).cloned().map(Profile::Client),
            UserType::Sp => state.sp_profiles.get(&user_id).cloned().map(Profile::Sp),
            UserType::Admin => state.admin_profiles.get(&user_id).cloned().map(Profile::Admin),
            UserType::Partner => None,
        };
        Ok(profile)
    }

    async fn find_sp_profile(&self, user_id: Uuid) -> AppResult<Option<SpProfile>> {
        let state = self.state.read().await;
        Ok(state.sp_profiles.get(&user_id).cloned())
    }

    async fn save_sp_profile(&self, profile: &SpProfile) -> AppResult<()> {
        let mut state = self.state.write().await;
        if let Some(existing) = state.sp_profiles.get_mut(&profile.user_id) {
            *existing = profile.clone();
        }
        Ok(())
    }

    async fn set_admin_active_role(&self, user_id: Uuid, role_id: Option<Uuid>) -> AppResult<()> {
        let mut state = self.state.write().await;
        state
            .admin_profiles
            .entry(user_id)
            .or_insert_with(|| AdminProfile {
                user_id,
                full_name: None,
                active_role_id: None,
                created_at: Utc::now(),
            })
            .active_role_id = role_id;
        Ok(())
    }

    async fn find_tenant(&self, id: Uuid) -> AppResult<Option<Tenant>> {
        let state = self.state.read().await;
        Ok(state.tenants.get(&id).cloned())
    }

    async fn count_tenants(&self) -> AppResult<u64> {
        let state = self.state.read().await;
        Ok(state.tenants.len() as u64)
    }
}
