//! User, tenant and profile repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use workgrid_core::result::AppResult;
use workgrid_core::types::pagination::PageRequest;
use workgrid_entity::profile::{AdminProfile, ClientProfile, Profile, SpProfile};
use workgrid_entity::tenant::Tenant;
use workgrid_entity::user::{User, UserType};

use super::db_err;
use crate::store::{AccountStore, NewAccount, NewProfile, UserFilter};

/// PostgreSQL-backed [`AccountStore`].
#[derive(Debug, Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    /// Create a new account repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountRepository {
    async fn create_account(&self, account: NewAccount) -> AppResult<User> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, phone, email, password_hash, user_type) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(account.user_id)
        .bind(&account.user.phone)
        .bind(&account.user.email)
        .bind(&account.user.password_hash)
        .bind(account.user.user_type)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err("Failed to create user"))?;

        if let Some((tenant_id, company_name)) = &account.tenant {
            sqlx::query("INSERT INTO tenants (id, company_name) VALUES ($1, $2)")
                .bind(tenant_id)
                .bind(company_name)
                .execute(&mut *tx)
                .await
                .map_err(db_err("Failed to create tenant"))?;
        }

        match &account.profile {
            NewProfile::Client {
                tenant_id,
                full_name,
            } => {
                sqlx::query(
                    "INSERT INTO client_profiles (user_id, tenant_id, full_name) VALUES ($1, $2, $3)",
                )
                .bind(user.id)
                .bind(tenant_id)
                .bind(full_name)
                .execute(&mut *tx)
                .await
                .map_err(db_err("Failed to create client profile"))?;
            }
            NewProfile::Sp => {
                sqlx::query("INSERT INTO sp_profiles (user_id) VALUES ($1)")
                    .bind(user.id)
                    .execute(&mut *tx)
                    .await
                    .map_err(db_err("Failed to create SP profile"))?;
            }
            NewProfile::Admin { full_name } => {
                sqlx::query("INSERT INTO admin_profiles (user_id, full_name) VALUES ($1, $2)")
                    .bind(user.id)
                    .bind(full_name)
                    .execute(&mut *tx)
                    .await
                    .map_err(db_err("Failed to create admin profile"))?;
            }
            NewProfile::None => {}
        }

        for role in &account.roles {
            sqlx::query(
                "INSERT INTO user_roles (id, user_id, role_id, tenant_id, expires_at, assigned_by_id) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(Uuid::new_v4())
            .bind(role.user_id)
            .bind(role.role_id)
            .bind(role.tenant_id)
            .bind(role.expires_at)
            .bind(role.assigned_by_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err("Failed to assign role"))?;
        }

        tx.commit()
            .await
            .map_err(db_err("Failed to commit account creation"))?;
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find user by id"))
    }

    async fn find_user_by_phone(&self, phone: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE phone = $1 AND deleted_at IS NULL")
            .bind(phone)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find user by phone"))
    }

    async fn touch_last_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login_at = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to update last login"))?;
        Ok(())
    }

    async fn soft_delete_user(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to delete user"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_users(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<User>, u64)> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE deleted_at IS NULL \
             AND ($1::user_type IS NULL OR user_type = $1) \
             AND ($2::user_status IS NULL OR status = $2)",
        )
        .bind(filter.user_type)
        .bind(filter.status)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to count users"))?;

        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE deleted_at IS NULL \
             AND ($1::user_type IS NULL OR user_type = $1) \
             AND ($2::user_status IS NULL OR status = $2) \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4",
        )
        .bind(filter.user_type)
        .bind(filter.status)
        .bind(page.limit as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list users"))?;

        Ok((users, total as u64))
    }

    async fn find_profile(&self, user_id: Uuid, user_type: UserType) -> AppResult<Option<Profile>> {
        let profile = match user_type {
            UserType::Client => {
                sqlx::query_as::<_, ClientProfile>("SELECT * FROM client_profiles WHERE user_id = $1")
                    .bind(user_id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(db_err("Failed to load client profile"))?
                    .map(Profile::Client)
            }
            UserType::Sp => self.find_sp_profile(user_id).await?.map(Profile::Sp),
            UserType::Admin => {
                sqlx::query_as::<_, AdminProfile>("SELECT * FROM admin_profiles WHERE user_id = $1")
                    .bind(user_id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(db_err("Failed to load admin profile"))?
                    .map(Profile::Admin)
            }
            UserType::Partner => None,
        };
        Ok(profile)
    }

    async fn find_sp_profile(&self, user_id: Uuid) -> AppResult<Option<SpProfile>> {
        sqlx::query_as::<_, SpProfile>("SELECT * FROM sp_profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to load SP profile"))
    }

    async fn save_sp_profile(&self, profile: &SpProfile) -> AppResult<()> {
        sqlx::query(
            "UPDATE sp_profiles SET full_name = $2, city = $3, state = $4, pincode = $5, \
             gender = $6, date_of_birth = $7, kyc_status = $8, updated_at = $9 \
             WHERE user_id = $1",
        )
        .bind(profile.user_id)
        .bind(&profile.full_name)
        .bind(&profile.city)
        .bind(&profile.state)
        .bind(&profile.pincode)
        .bind(profile.gender)
        .bind(profile.date_of_birth)
        .bind(profile.kyc_status)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to save SP profile"))?;
        Ok(())
    }

    async fn set_admin_active_role(&self, user_id: Uuid, role_id: Option<Uuid>) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO admin_profiles (user_id, active_role_id) VALUES ($1, $2) \
             ON CONFLICT (user_id) DO UPDATE SET active_role_id = EXCLUDED.active_role_id",
        )
        .bind(user_id)
        .bind(role_id)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to set admin active role"))?;
        Ok(())
    }

    async fn find_tenant(&self, id: Uuid) -> AppResult<Option<Tenant>> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find tenant"))
    }

    async fn count_tenants(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tenants")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("Failed to count tenants"))?;
        Ok(count as u64)
    }
}
