//! Typed API client.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ClientError, ClientResult};
use crate::refresh::RefreshCoordinator;
use crate::session::{CookieMirror, SessionState, SessionStore, sync_cookie_mirror};
use crate::types::{AuthPayload, Envelope, LoginPayload, SignupInput, UserSummary};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the WorkGrid HTTP API.
///
/// Cheap to clone; clones share the session stores and the refresh guard.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Arc<str>,
    session: SessionStore,
    mirror: CookieMirror,
    refresher: Arc<RefreshCoordinator>,
}

impl ApiClient {
    /// Creates a client for the server at `base_url` (e.g. `http://localhost:8080`).
    pub fn new(base_url: impl AsRef<str>) -> ClientResult<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: Arc::from(base_url.as_ref().trim_end_matches('/')),
            session: SessionStore::new(),
            mirror: CookieMirror::new(),
            refresher: Arc::new(RefreshCoordinator::new()),
        })
    }

    /// Application-tier session.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Edge-tier cookie mirror.
    pub fn cookie_mirror(&self) -> &CookieMirror {
        &self.mirror
    }

    /// Refreshes started so far by this client and its clones.
    pub fn refreshes_started(&self) -> u64 {
        self.refresher.started()
    }

    /// Registers a new account and stores its session.
    pub async fn signup(&self, input: &SignupInput) -> ClientResult<AuthPayload> {
        let request = self.request(Method::POST, "/auth/signup").json(input);
        let payload: AuthPayload = decode(request.send().await?).await?;
        self.store(payload.clone());
        Ok(payload)
    }

    /// Logs in. A multi-role admin gets a challenge back and no session yet.
    pub async fn login(&self, phone: &str, password: &str) -> ClientResult<LoginPayload> {
        let request = self
            .request(Method::POST, "/auth/login")
            .json(&json!({ "phone": phone, "password": password }));
        let payload: LoginPayload = decode(request.send().await?).await?;
        if let LoginPayload::Authenticated(auth) = &payload {
            self.store(auth.clone());
        }
        Ok(payload)
    }

    /// Answers a role-selection challenge.
    pub async fn select_role(&self, temp_token: &str, role_id: Uuid) -> ClientResult<AuthPayload> {
        let request = self
            .request(Method::POST, "/auth/admin/select-role")
            .bearer_auth(temp_token)
            .json(&json!({ "roleId": role_id }));
        let payload: AuthPayload = decode(request.send().await?).await?;
        self.store(payload.clone());
        Ok(payload)
    }

    /// Rotates the stored refresh token. Concurrent calls share one request.
    pub async fn refresh(&self) -> ClientResult<SessionState> {
        let http = self.http.clone();
        let url = self.url("/auth/refresh");
        let session = self.session.clone();
        let mirror = self.mirror.clone();

        self.refresher
            .run(move || async move {
                let refresh_token = session.refresh_token().ok_or(ClientError::NotAuthenticated)?;
                debug!("Refreshing access token");
                let response = http
                    .post(url)
                    .json(&json!({ "refreshToken": refresh_token }))
                    .send()
                    .await?;
                match decode::<AuthPayload>(response).await {
                    Ok(payload) => {
                        let state = SessionState::from(payload);
                        session.set(state.clone());
                        sync_cookie_mirror(&session, &mirror);
                        Ok(state)
                    }
                    Err(err) if err.is_unauthorized() => {
                        warn!("Refresh token rejected; clearing session");
                        session.clear();
                        sync_cookie_mirror(&session, &mirror);
                        Err(ClientError::NotAuthenticated)
                    }
                    Err(err) => Err(err),
                }
            })
            .await
    }

    /// Logs out server-side and clears both session tiers.
    pub async fn logout(&self) -> ClientResult<()> {
        let result = self
            .authed::<serde_json::Value, ()>(Method::POST, "/auth/logout", None)
            .await
            .map(|_| ());
        self.session.clear();
        sync_cookie_mirror(&self.session, &self.mirror);
        info!("Logged out");
        result
    }

    /// The signed-in user.
    pub async fn me(&self) -> ClientResult<UserSummary> {
        self.authed::<UserSummary, ()>(Method::GET, "/auth/me", None).await
    }

    /// Authenticated GET returning the envelope's `data`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.authed::<T, ()>(Method::GET, path, None).await
    }

    /// Authenticated request with a JSON body.
    pub async fn send<T, B>(&self, method: Method, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        self.authed(method, path, Some(body)).await
    }

    /// Sends with the stored access token, refreshing first when it has
    /// expired and retrying once on a 401.
    async fn authed<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let mut state = self.session.get().ok_or(ClientError::NotAuthenticated)?;
        if state.access_expired(Utc::now()) {
            state = self.refresh().await?;
        }

        match self.send_once(method.clone(), path, body, &state.access_token).await {
            Err(err) if err.is_unauthorized() => {
                let current = self.session.access_token();
                // Another caller may already have rotated the pair.
                let token = match current {
                    Some(token) if token != state.access_token => token,
                    _ => self.refresh().await?.access_token,
                };
                self.send_once(method, path, body, &token).await
            }
            other => other,
        }
    }

    async fn send_once<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        access_token: &str,
    ) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let mut request = self.request(method, path).bearer_auth(access_token);
        if let Some(body) = body {
            request = request.json(body);
        }
        decode(request.send().await?).await
    }

    fn store(&self, payload: AuthPayload) {
        self.session.set(SessionState::from(payload));
        sync_cookie_mirror(&self.session, &self.mirror);
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Unwraps the response envelope.
///
/// Endpoints without data decode into `T = ()` via a `null` payload.
async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status().as_u16();
    let bytes = response.bytes().await?;
    let envelope: Envelope<serde_json::Value> = serde_json::from_slice(&bytes)
        .map_err(|e| ClientError::Decode(format!("HTTP {status}: {e}")))?;

    if !envelope.success {
        return Err(ClientError::Api {
            status: envelope.status_code,
            message: envelope.message,
            errors: envelope.errors.unwrap_or_default(),
        });
    }

    let data = envelope.data.unwrap_or(serde_json::Value::Null);
    serde_json::from_value(data).map_err(|e| ClientError::Decode(e.to_string()))
}
