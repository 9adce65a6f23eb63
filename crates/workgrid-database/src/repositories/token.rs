//! Refresh-token and admin-session repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use workgrid_core::result::AppResult;
use workgrid_entity::session::{
    AdminSession, CreateAdminSession, CreateRefreshToken, RefreshTokenRecord,
};

use super::db_err;
use crate::store::TokenStore;

/// PostgreSQL-backed [`TokenStore`].
#[derive(Debug, Clone)]
pub struct PgTokenRepository {
    pool: PgPool,
}

impl PgTokenRepository {
    /// Create a new token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenStore for PgTokenRepository {
    async fn store_refresh_token(&self, token: CreateRefreshToken) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO refresh_tokens (id, user_id, token_hash, family_id, expires_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(token.id)
        .bind(token.user_id)
        .bind(&token.token_hash)
        .bind(token.family_id)
        .bind(token.expires_at)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to store refresh token"))?;
        Ok(())
    }

    async fn find_refresh_token(&self, token_hash: &str) -> AppResult<Option<RefreshTokenRecord>> {
        sqlx::query_as::<_, RefreshTokenRecord>(
            "SELECT * FROM refresh_tokens WHERE token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to find refresh token"))
    }

    async fn revoke_refresh_token(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() WHERE id = $1 AND revoked_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to revoke refresh token"))?;
        Ok(result.rows_affected() == 1)
    }

    async fn revoke_user_refresh_tokens(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() \
             WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to revoke user refresh tokens"))?;
        Ok(result.rows_affected())
    }

    async fn revoke_token_family(&self, family_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() \
             WHERE family_id = $1 AND revoked_at IS NULL",
        )
        .bind(family_id)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to revoke token family"))?;
        Ok(result.rows_affected())
    }

    async fn create_admin_session(&self, session: CreateAdminSession) -> AppResult<AdminSession> {
        sqlx::query_as::<_, AdminSession>(
            "INSERT INTO admin_sessions (id, user_id, role_id, ip_address, user_agent) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(session.user_id)
        .bind(session.role_id)
        .bind(&session.ip_address)
        .bind(&session.user_agent)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to create admin session"))
    }

    async fn find_admin_session(&self, id: Uuid) -> AppResult<Option<AdminSession>> {
        sqlx::query_as::<_, AdminSession>("SELECT * FROM admin_sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find admin session"))
    }

    async fn terminate_admin_sessions(
        &self,
        user_id: Uuid,
        except: Option<Uuid>,
        reason: &str,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE admin_sessions SET terminated_at = NOW(), terminated_reason = $3 \
             WHERE user_id = $1 AND terminated_at IS NULL \
             AND ($2::uuid IS NULL OR id <> $2)",
        )
        .bind(user_id)
        .bind(except)
        .bind(reason)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to terminate admin sessions"))?;
        Ok(result.rows_affected())
    }
}
