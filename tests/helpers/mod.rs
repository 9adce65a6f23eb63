//! Shared test helpers for integration tests.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use workgrid_api::AppState;
use workgrid_core::config::{AppConfig, DatabaseProvider};
use workgrid_database::{NewAccount, NewProfile, Stores};
use workgrid_entity::role::AssignUserRole;
use workgrid_entity::user::{CreateUser, UserType};

pub const PASSWORD: &str = "Str0ng-pass!";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Wired services, for setup and direct assertions
    pub state: AppState,
}

impl TestApp {
    /// Create a new test application backed by the in-memory store.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Same as [`TestApp::new`] with a tweak applied to the config first.
    pub async fn with_config(tweak: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = AppConfig::default();
        config.database.provider = DatabaseProvider::Memory;
        config.auth.jwt_secret = "integration-test-secret-key".into();
        config.auth.argon2_memory_kib = 1024;
        config.auth.argon2_iterations = 1;
        tweak(&mut config);

        let stores = Stores::memory();
        workgrid_service::seed_catalog(&stores)
            .await
            .expect("Failed to seed catalog");

        let state = AppState::new(config, stores).expect("Failed to build state");
        let router = workgrid_api::router::build_router(state.clone());

        Self { router, state }
    }

    pub fn stores(&self) -> &Stores {
        &self.state.stores
    }

    /// Id of a seeded or created role.
    pub async fn role_id(&self, name: &str) -> Uuid {
        self.stores()
            .roles
            .find_role_by_name(name)
            .await
            .expect("Failed to look up role")
            .unwrap_or_else(|| panic!("Role {name} does not exist"))
            .id
    }

    /// Id of a seeded permission.
    pub async fn permission_id(&self, name: &str) -> Uuid {
        self.stores()
            .roles
            .find_permission_by_name(name)
            .await
            .expect("Failed to look up permission")
            .unwrap_or_else(|| panic!("Permission {name} does not exist"))
            .id
    }

    /// Insert an admin holding the named roles and return their ID.
    pub async fn create_admin(&self, phone: &str, roles: &[&str]) -> Uuid {
        let password_hash = self
            .state
            .session_manager
            .password_hasher()
            .hash_password(PASSWORD)
            .expect("Failed to hash password");
        let user_id = Uuid::new_v4();

        let mut assignments = Vec::new();
        for name in roles {
            assignments.push(AssignUserRole {
                user_id,
                role_id: self.role_id(name).await,
                tenant_id: None,
                expires_at: None,
                assigned_by_id: None,
            });
        }

        self.stores()
            .accounts
            .create_account(NewAccount {
                user_id,
                user: CreateUser {
                    phone: phone.to_string(),
                    email: None,
                    password_hash,
                    user_type: UserType::Admin,
                },
                tenant: None,
                profile: NewProfile::Admin {
                    full_name: Some("Test Admin".into()),
                },
                roles: assignments,
            })
            .await
            .expect("Failed to create admin");

        user_id
    }

    /// Sign up through the API and return the response data.
    pub async fn signup(&self, phone: &str, user_type: &str, company: Option<&str>) -> Value {
        let response = self
            .request(
                "POST",
                "/auth/signup",
                Some(json!({
                    "phone": phone,
                    "password": PASSWORD,
                    "userType": user_type,
                    "companyName": company,
                })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Signup failed: {:?}",
            response.body
        );
        response.body["data"].clone()
    }

    /// Login and return the response data.
    pub async fn login(&self, phone: &str) -> Value {
        let response = self
            .request(
                "POST",
                "/auth/login",
                Some(json!({ "phone": phone, "password": PASSWORD })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );
        response.body["data"].clone()
    }

    /// Login and return the access token. Fails for multi-role admins.
    pub async fn access_token(&self, phone: &str) -> String {
        self.login(phone).await["accessToken"]
            .as_str()
            .expect("No accessToken in login response")
            .to_string()
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}
