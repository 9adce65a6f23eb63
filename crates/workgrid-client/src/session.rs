//! The two client-side session tiers and the contract that keeps them aligned.
//!
//! [`SessionStore`] is authoritative. [`CookieMirror`] carries only what an
//! edge router needs to decide where to send a request (is anyone signed in,
//! as which actor type, with which roles) and never holds a token. It is
//! written exclusively by [`sync_cookie_mirror`].

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{AuthPayload, UserSummary};

/// Cookie name the mirror is published under.
pub const AUTH_COOKIE_NAME: &str = "wg_auth";

/// Everything the application knows about the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub user: UserSummary,
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

impl SessionState {
    /// Whether the access token should be refreshed before use.
    pub fn access_expired(&self, now: DateTime<Utc>) -> bool {
        self.access_expires_at <= now
    }

    /// Whether the refresh token can still be redeemed.
    pub fn refreshable(&self, now: DateTime<Utc>) -> bool {
        self.refresh_expires_at > now
    }
}

impl From<AuthPayload> for SessionState {
    fn from(payload: AuthPayload) -> Self {
        Self {
            user: payload.user,
            access_token: payload.access_token,
            refresh_token: payload.refresh_token,
            access_expires_at: payload.access_expires_at,
            refresh_expires_at: payload.refresh_expires_at,
        }
    }
}

/// Application-tier session storage.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Option<SessionState>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the current session.
    pub fn get(&self) -> Option<SessionState> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set(&self, state: SessionState) {
        *self.write() = Some(state);
    }

    pub fn clear(&self) {
        *self.write() = None;
    }

    /// Refresh token of the current session.
    pub fn refresh_token(&self) -> Option<String> {
        self.get().map(|s| s.refresh_token)
    }

    /// Access token of the current session.
    pub fn access_token(&self) -> Option<String> {
        self.get().map(|s| s.access_token)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<SessionState>> {
        match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// What the edge tier sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthCookie {
    pub user_id: Uuid,
    pub user_type: String,
    pub roles: Vec<String>,
    pub tenant_id: Option<Uuid>,
    /// The cookie stops being trusted once the refresh token has expired.
    pub expires_at: DateTime<Utc>,
}

impl AuthCookie {
    fn from_session(state: &SessionState) -> Self {
        Self {
            user_id: state.user.id,
            user_type: state.user.user_type.clone(),
            roles: state.user.roles.clone(),
            tenant_id: state.user.tenant_id,
            expires_at: state.refresh_expires_at,
        }
    }
}

/// Edge-tier mirror of the session.
#[derive(Debug, Clone, Default)]
pub struct CookieMirror {
    inner: Arc<RwLock<Option<AuthCookie>>>,
}

impl CookieMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<AuthCookie> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// `Set-Cookie` value publishing the mirror, or expiring it when empty.
    pub fn set_cookie_header(&self) -> String {
        match self.get() {
            Some(cookie) => {
                let value = serde_json::to_string(&cookie).unwrap_or_default();
                let max_age = (cookie.expires_at - Utc::now()).num_seconds().max(0);
                format!(
                    "{AUTH_COOKIE_NAME}={}; Path=/; Max-Age={max_age}; SameSite=Lax",
                    percent_encode(&value)
                )
            }
            None => format!("{AUTH_COOKIE_NAME}=; Path=/; Max-Age=0; SameSite=Lax"),
        }
    }

    fn replace(&self, value: Option<AuthCookie>) {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = value;
    }
}

/// Brings `mirror` in line with `store`. Returns whether the mirror changed.
///
/// Call after every mutation of the store: login, role selection, refresh
/// and logout all go through [`ApiClient`](crate::ApiClient), which does so.
pub fn sync_cookie_mirror(store: &SessionStore, mirror: &CookieMirror) -> bool {
    let wanted = store.get().as_ref().map(AuthCookie::from_session);
    if mirror.get() == wanted {
        return false;
    }
    mirror.replace(wanted);
    true
}

fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(roles: &[&str]) -> SessionState {
        let now = Utc::now();
        SessionState {
            user: UserSummary {
                id: Uuid::new_v4(),
                phone: "9876543210".into(),
                user_type: "ADMIN".into(),
                roles: roles.iter().map(|r| r.to_string()).collect(),
                permissions: vec!["roles:read".into()],
                tenant_id: None,
            },
            access_token: "access".into(),
            refresh_token: "refresh".into(),
            access_expires_at: now + Duration::minutes(15),
            refresh_expires_at: now + Duration::days(7),
        }
    }

    #[test]
    fn test_sync_copies_projection_without_tokens() {
        let store = SessionStore::new();
        let mirror = CookieMirror::new();
        store.set(session(&["SUPER_ADMIN"]));

        assert!(sync_cookie_mirror(&store, &mirror));
        let cookie = mirror.get().unwrap();
        assert_eq!(cookie.roles, vec!["SUPER_ADMIN".to_string()]);
        assert!(!mirror.set_cookie_header().contains("access"));

        // Already in sync.
        assert!(!sync_cookie_mirror(&store, &mirror));
    }

    #[test]
    fn test_sync_after_clear_expires_cookie() {
        let store = SessionStore::new();
        let mirror = CookieMirror::new();
        store.set(session(&["SUPPORT_ADMIN"]));
        sync_cookie_mirror(&store, &mirror);

        store.clear();
        assert!(sync_cookie_mirror(&store, &mirror));
        assert!(mirror.get().is_none());
        assert!(mirror.set_cookie_header().contains("Max-Age=0"));
    }

    #[test]
    fn test_role_change_propagates() {
        let store = SessionStore::new();
        let mirror = CookieMirror::new();
        let mut state = session(&["SUPER_ADMIN"]);
        store.set(state.clone());
        sync_cookie_mirror(&store, &mirror);

        state.user.roles = vec!["SUPPORT_ADMIN".into()];
        store.set(state);
        assert!(sync_cookie_mirror(&store, &mirror));
        assert_eq!(mirror.get().unwrap().roles, vec!["SUPPORT_ADMIN".to_string()]);
    }
}
