use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use workgrid_core::error::AppError;
use workgrid_core::result::AppResult;
use workgrid_entity::session::{
    AdminSession, CreateAdminSession, CreateRefreshToken, RefreshTokenRecord,
};

use super::MemoryStore;
use crate::store::TokenStore;

#[async_trait]
impl TokenStore for MemoryStore {
    async fn store_refresh_token(&self, token: CreateRefreshToken) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.refresh_tokens.contains_key(&token.token_hash) {
            return Err(AppError::conflict("Resource already exists"));
        }
        state.refresh_tokens.insert(
            token.token_hash.clone(),
            RefreshTokenRecord {
                id: token.id,
                user_id: token.user_id,
                token_hash: token.token_hash,
                family_id: token.family_id,
                expires_at: token.expires_at,
                revoked_at: None,
                created_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn find_refresh_token(&self, token_hash: &str) -> AppResult<Option<RefreshTokenRecord>> {
        Ok(self.state.read().await.refresh_tokens.get(token_hash).cloned())
    }

    async fn revoke_refresh_token(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let record = state
            .refresh_tokens
            .values_mut()
            .find(|t| t.id == id && t.revoked_at.is_none());
        match record {
            Some(record) => {
                record.revoked_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn revoke_user_refresh_tokens(&self, user_id: Uuid) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let mut revoked = 0;
        for token in state.refresh_tokens.values_mut() {
            if token.user_id == user_id && token.revoked_at.is_none() {
                token.revoked_at = Some(now);
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn revoke_token_family(&self, family_id: Uuid) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let mut revoked = 0;
        for token in state.refresh_tokens.values_mut() {
            if token.family_id == family_id && token.revoked_at.is_none() {
                token.revoked_at = Some(now);
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn create_admin_session(&self, session: CreateAdminSession) -> AppResult<AdminSession> {
        let mut state = self.state.write().await;
        let created = AdminSession {
            id: Uuid::new_v4(),
            user_id: session.user_id,
            role_id: session.role_id,
            ip_address: session.ip_address,
            user_agent: session.user_agent,
            created_at: Utc::now(),
            terminated_at: None,
            terminated_reason: None,
        };
        state.admin_sessions.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_admin_session(&self, id: Uuid) -> AppResult<Option<AdminSession>> {
        Ok(self.state.read().await.admin_sessions.get(&id).cloned())
    }

    async fn terminate_admin_sessions(
        &self,
        user_id: Uuid,
        except: Option<Uuid>,
        reason: &str,
    ) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let mut terminated = 0;
        for session in state.admin_sessions.values_mut() {
            if session.user_id == user_id && session.is_active() && Some(session.id) != except {
                session.terminated_at = Some(now);
                session.terminated_reason = Some(reason.to_string());
                terminated += 1;
            }
        }
        Ok(terminated)
    }
}
