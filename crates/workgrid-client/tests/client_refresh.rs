//! Drives `ApiClient` against a stub server that mimics the auth endpoints.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use uuid::Uuid;

use workgrid_client::{ApiClient, ClientError, LoginPayload};

#[derive(Clone, Default)]
struct Stub {
    refresh_calls: Arc<AtomicUsize>,
}

fn envelope(status: StatusCode, data: Value, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({
            "success": status.is_success(),
            "data": data,
            "message": message,
            "statusCode": status.as_u16(),
        })),
    )
}

fn auth_payload(generation: usize) -> Value {
    let now = chrono::Utc::now();
    json!({
        "requiresRoleSelection": false,
        "user": {
            "id": Uuid::nil(),
            "phone": "9876543210",
            "userType": "SP",
            "roles": ["SP_BASIC"],
            "permissions": ["profile:read"],
            "tenantId": null
        },
        "accessToken": format!("access-{generation}"),
        "refreshToken": format!("refresh-{generation}"),
        "accessExpiresAt": now + chrono::Duration::minutes(15),
        "refreshExpiresAt": now + chrono::Duration::days(7),
    })
}

async fn login() -> (StatusCode, Json<Value>) {
    envelope(StatusCode::OK, auth_payload(1), "Login successful")
}

async fn refresh(State(stub): State<Stub>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let call = stub.refresh_calls.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(100)).await;
    if body["refreshToken"] != format!("refresh-{}", call + 1) {
        return envelope(StatusCode::UNAUTHORIZED, Value::Null, "Invalid refresh token");
    }
    envelope(StatusCode::OK, auth_payload(call + 2), "Token refreshed")
}

/// Only the rotated access token is accepted.
async fn me(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if token == "Bearer access-2" {
        envelope(StatusCode::OK, auth_payload(2)["user"].clone(), "OK")
    } else {
        envelope(StatusCode::UNAUTHORIZED, Value::Null, "Invalid token")
    }
}

async fn spawn_stub() -> (String, Stub) {
    let stub = Stub::default();
    let app = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/me", get(me))
        .with_state(stub.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), stub)
}

#[tokio::test]
async fn test_concurrent_401s_trigger_one_refresh() {
    let (base_url, stub) = spawn_stub().await;
    let client = ApiClient::new(&base_url).unwrap();

    let payload = client.login("9876543210", "Secret123").await.unwrap();
    assert!(matches!(payload, LoginPayload::Authenticated(_)));
    assert!(client.cookie_mirror().get().is_some());

    let calls: Vec<_> = (0..5)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.me().await })
        })
        .collect();
    for call in calls {
        let user = call.await.unwrap().unwrap();
        assert_eq!(user.roles, vec!["SP_BASIC".to_string()]);
    }

    assert_eq!(stub.refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(client.refreshes_started(), 1);
    assert_eq!(client.session().access_token().as_deref(), Some("access-2"));
}

#[tokio::test]
async fn test_rejected_refresh_clears_both_tiers() {
    let (base_url, stub) = spawn_stub().await;
    let client = ApiClient::new(&base_url).unwrap();
    client.login("9876543210", "Secret123").await.unwrap();

    // Burn refresh-1 so the stored token is rejected.
    stub.refresh_calls.store(5, Ordering::SeqCst);

    let err = client.refresh().await.unwrap_err();
    assert!(matches!(err, ClientError::NotAuthenticated));
    assert!(client.session().get().is_none());
    assert!(client.cookie_mirror().get().is_none());
}

#[tokio::test]
async fn test_authed_call_without_session() {
    let (base_url, _stub) = spawn_stub().await;
    let client = ApiClient::new(&base_url).unwrap();
    assert!(matches!(client.me().await, Err(ClientError::NotAuthenticated)));
}
