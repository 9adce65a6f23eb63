//! Integration tests for signup, login, role selection, refresh and logout.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use helpers::{PASSWORD, TestApp};

#[tokio::test]
async fn test_client_signup_creates_tenant_and_scoped_admin_role() {
    let app = TestApp::new().await;

    let data = app.signup("9000000001", "CLIENT", Some("Acme Facilities")).await;

    assert_eq!(data["requiresRoleSelection"], json!(false));
    assert!(data["accessToken"].is_string());
    assert!(data["refreshToken"].is_string());
    assert_eq!(data["user"]["userType"], json!("CLIENT"));
    assert_eq!(data["user"]["roles"], json!(["CLIENT_ADMIN"]));
    assert!(data["user"].get("passwordHash").is_none());

    let tenant_id: Uuid = serde_json::from_value(data["user"]["tenantId"].clone()).unwrap();
    assert_eq!(app.stores().accounts.count_tenants().await.unwrap(), 1);
    let tenant = app.stores().accounts.find_tenant(tenant_id).await.unwrap().unwrap();
    assert_eq!(tenant.company_name, "Acme Facilities");

    let user_id: Uuid = serde_json::from_value(data["user"]["id"].clone()).unwrap();
    let roles = app.stores().roles.list_user_roles(user_id).await.unwrap();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0].role_name, "CLIENT_ADMIN");
    assert_eq!(roles[0].assignment.tenant_id, Some(tenant_id));
}

#[tokio::test]
async fn test_sp_signup_starts_profile_incomplete() {
    let app = TestApp::new().await;

    let data = app.signup("9000000002", "SP", None).await;

    assert_eq!(data["user"]["roles"], json!(["SP_BASIC"]));
    assert_eq!(data["user"]["profile"]["kycStatus"], json!("PROFILE_INCOMPLETE"));
    assert_eq!(app.stores().accounts.count_tenants().await.unwrap(), 0);
}

#[tokio::test]
async fn test_duplicate_phone_conflicts() {
    let app = TestApp::new().await;
    app.signup("9000000003", "SP", None).await;

    let response = app
        .request(
            "POST",
            "/auth/signup",
            Some(json!({
                "phone": "9000000003",
                "password": PASSWORD,
                "userType": "CLIENT",
                "companyName": "Other Co",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["success"], json!(false));
    assert_eq!(response.body["statusCode"], json!(409));
    assert_eq!(app.stores().accounts.count_tenants().await.unwrap(), 0);
}

#[tokio::test]
async fn test_signup_validation_envelope_lists_fields() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/auth/signup",
            Some(json!({
                "phone": "12345",
                "email": "not-an-email",
                "password": PASSWORD,
                "userType": "SP",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["data"], json!(null));
    let errors: Vec<String> = serde_json::from_value(response.body["errors"].clone()).unwrap();
    assert!(errors.iter().any(|e| e.starts_with("phone:")), "{errors:?}");
    assert!(errors.iter().any(|e| e.starts_with("email:")), "{errors:?}");
}

#[tokio::test]
async fn test_admin_cannot_self_register() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/auth/signup",
            Some(json!({
                "phone": "9000000004",
                "password": PASSWORD,
                "userType": "ADMIN",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], json!("Validation failed"));
    assert!(
        response.body["errors"][0]
            .as_str()
            .unwrap()
            .starts_with("userType:")
    );
}

/// Posts a signup body and returns the 400 response's `errors`.
async fn rejected_signup(app: &TestApp, body: serde_json::Value) -> Vec<String> {
    let response = app.request("POST", "/auth/signup", Some(body), None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST, "{:?}", response.body);
    assert_eq!(response.body["success"], json!(false));
    assert_eq!(response.body["statusCode"], json!(400));
    assert_eq!(response.body["message"], json!("Validation failed"));
    assert_eq!(response.body["data"], json!(null));
    serde_json::from_value(response.body["errors"].clone()).unwrap()
}

#[tokio::test]
async fn test_client_signup_requires_company_name() {
    let app = TestApp::new().await;

    let errors = rejected_signup(
        &app,
        json!({ "phone": "9000000020", "password": PASSWORD, "userType": "CLIENT" }),
    )
    .await;

    assert_eq!(errors, vec!["companyName: required for CLIENT users"]);
    assert_eq!(app.stores().accounts.count_tenants().await.unwrap(), 0);
}

#[tokio::test]
async fn test_company_name_rejected_for_non_client() {
    let app = TestApp::new().await;

    for user_type in ["SP", "PARTNER"] {
        let errors = rejected_signup(
            &app,
            json!({
                "phone": "9000000021",
                "password": PASSWORD,
                "userType": user_type,
                "companyName": "Side Business",
            }),
        )
        .await;
        assert_eq!(errors, vec!["companyName: only allowed for CLIENT users"]);
    }
    assert_eq!(app.stores().accounts.count_tenants().await.unwrap(), 0);
}

#[tokio::test]
async fn test_signup_enforces_password_policy() {
    let app = TestApp::new().await;
    let cases = [
        ("Short1", "password: must be at least 8 characters long"),
        ("lowercase1", "password: must contain at least one uppercase letter"),
        ("NoDigitsHere", "password: must contain at least one digit"),
    ];

    for (password, expected) in cases {
        let errors = rejected_signup(
            &app,
            json!({ "phone": "9000000022", "password": password, "userType": "SP" }),
        )
        .await;
        assert_eq!(errors, vec![expected.to_string()], "password {password}");
    }

    // Nothing was created, so the phone is still free.
    app.signup("9000000022", "SP", None).await;
}

#[tokio::test]
async fn test_malformed_body_uses_validation_envelope() {
    let app = TestApp::new().await;

    let errors = rejected_signup(&app, json!({ "phone": "9000000023", "userType": "SP" })).await;

    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("password"), "{errors:?}");
}

#[tokio::test]
async fn test_wrong_password_leaves_last_login_untouched() {
    let app = TestApp::new().await;
    let data = app.signup("9000000005", "SP", None).await;
    let user_id: Uuid = serde_json::from_value(data["user"]["id"].clone()).unwrap();
    let before = app
        .stores()
        .accounts
        .find_user(user_id)
        .await
        .unwrap()
        .unwrap()
        .last_login_at;

    let response = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({ "phone": "9000000005", "password": "wrong-password" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let unknown = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({ "phone": "9999999999", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.body["message"], response.body["message"]);

    let after = app
        .stores()
        .accounts
        .find_user(user_id)
        .await
        .unwrap()
        .unwrap()
        .last_login_at;
    assert_eq!(before, after);

    app.login("9000000005").await;
    let logged_in = app
        .stores()
        .accounts
        .find_user(user_id)
        .await
        .unwrap()
        .unwrap()
        .last_login_at;
    assert!(logged_in.is_some());
}

#[tokio::test]
async fn test_single_role_admin_logs_in_directly() {
    let app = TestApp::new().await;
    app.create_admin("9100000001", &["SUPER_ADMIN"]).await;

    let data = app.login("9100000001").await;

    assert_eq!(data["requiresRoleSelection"], json!(false));
    assert_eq!(data["user"]["roles"], json!(["SUPER_ADMIN"]));
    let permissions: Vec<String> =
        serde_json::from_value(data["user"]["permissions"].clone()).unwrap();
    assert!(permissions.contains(&"roles:write".to_string()));
}

#[tokio::test]
async fn test_role_held_under_two_scopes_counts_once() {
    let app = TestApp::new().await;
    app.create_admin("9100000005", &["SUPER_ADMIN"]).await;
    let token = app.access_token("9100000005").await;
    let target = app.create_admin("9100000006", &["SUPER_ADMIN"]).await;
    let client = app.signup("9100000007", "CLIENT", Some("Scoped Co")).await;

    let response = app
        .request(
            "POST",
            &format!("/admin/users/{target}/roles"),
            Some(json!({
                "roleId": app.role_id("SUPER_ADMIN").await,
                "tenantId": client["user"]["tenantId"],
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);

    let data = app.login("9100000006").await;
    assert_eq!(data["requiresRoleSelection"], json!(false));
    assert!(data["accessToken"].is_string());
    assert_eq!(data["user"]["roles"], json!(["SUPER_ADMIN"]));
}

#[tokio::test]
async fn test_multi_role_admin_selects_role() {
    let app = TestApp::new().await;
    app.create_admin("9100000002", &["SUPER_ADMIN", "SUPPORT_ADMIN"])
        .await;

    let challenge = app.login("9100000002").await;
    assert_eq!(challenge["requiresRoleSelection"], json!(true));
    assert!(challenge.get("accessToken").is_none());
    let mut names: Vec<String> = challenge["availableRoles"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["SUPER_ADMIN", "SUPPORT_ADMIN"]);

    let temp_token = challenge["tempToken"].as_str().unwrap();

    // The temp token is not an access token.
    let me = app.request("GET", "/auth/me", None, Some(temp_token)).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);

    let support_id = app.role_id("SUPPORT_ADMIN").await;
    let response = app
        .request(
            "POST",
            "/auth/admin/select-role",
            Some(json!({ "roleId": support_id })),
            Some(temp_token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    let data = &response.body["data"];
    assert_eq!(data["selectedRole"]["name"], json!("SUPPORT_ADMIN"));
    assert_eq!(data["user"]["roles"], json!(["SUPPORT_ADMIN"]));
    let permissions: Vec<String> =
        serde_json::from_value(data["user"]["permissions"].clone()).unwrap();
    assert!(permissions.contains(&"roles:read".to_string()));
    assert!(!permissions.contains(&"roles:write".to_string()));

    let access = data["accessToken"].as_str().unwrap();
    let me = app.request("GET", "/auth/me", None, Some(access)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["roles"], json!(["SUPPORT_ADMIN"]));
}

#[tokio::test]
async fn test_selecting_role_outside_set_is_forbidden() {
    let app = TestApp::new().await;
    app.create_admin("9100000003", &["SUPER_ADMIN", "SUPPORT_ADMIN"])
        .await;
    let challenge = app.login("9100000003").await;
    let temp_token = challenge["tempToken"].as_str().unwrap();

    let client_admin = app.role_id("CLIENT_ADMIN").await;
    let response = app
        .request(
            "POST",
            "/auth/admin/select-role",
            Some(json!({ "roleId": client_admin })),
            Some(temp_token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_without_roles_cannot_log_in() {
    let app = TestApp::new().await;
    app.create_admin("9100000004", &[]).await;

    let response = app
        .request(
            "POST",
            "/auth/login",
            Some(json!({ "phone": "9100000004", "password": PASSWORD })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_refresh_rotates_and_rejects_reuse() {
    let app = TestApp::new().await;
    let data = app.signup("9000000006", "SP", None).await;
    let first = data["refreshToken"].as_str().unwrap().to_string();

    let response = app
        .request(
            "POST",
            "/auth/refresh",
            Some(json!({ "refreshToken": first })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    let second = response.body["data"]["refreshToken"]
        .as_str()
        .unwrap()
        .to_string();
    assert_ne!(first, second);

    let replay = app
        .request(
            "POST",
            "/auth/refresh",
            Some(json!({ "refreshToken": first })),
            None,
        )
        .await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);

    // Family revocation is off by default, so the rotated token survives.
    let next = app
        .request(
            "POST",
            "/auth/refresh",
            Some(json!({ "refreshToken": second })),
            None,
        )
        .await;
    assert_eq!(next.status, StatusCode::OK);
}

#[tokio::test]
async fn test_reuse_revokes_family_when_enabled() {
    let app = TestApp::with_config(|config| config.auth.revoke_family_on_reuse = true).await;
    let data = app.signup("9000000007", "SP", None).await;
    let first = data["refreshToken"].as_str().unwrap().to_string();

    let rotated = app
        .request(
            "POST",
            "/auth/refresh",
            Some(json!({ "refreshToken": first })),
            None,
        )
        .await;
    let second = rotated.body["data"]["refreshToken"]
        .as_str()
        .unwrap()
        .to_string();

    let replay = app
        .request(
            "POST",
            "/auth/refresh",
            Some(json!({ "refreshToken": first })),
            None,
        )
        .await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);

    let next = app
        .request(
            "POST",
            "/auth/refresh",
            Some(json!({ "refreshToken": second })),
            None,
        )
        .await;
    assert_eq!(next.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_access_token_is_not_a_refresh_token() {
    let app = TestApp::new().await;
    let data = app.signup("9000000008", "SP", None).await;

    let response = app
        .request(
            "POST",
            "/auth/refresh",
            Some(json!({ "refreshToken": data["accessToken"] })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_every_refresh_token() {
    let app = TestApp::new().await;
    let signup = app.signup("9000000009", "SP", None).await;
    let second_device = app.login("9000000009").await;
    let access = second_device["accessToken"].as_str().unwrap();

    let response = app.request("POST", "/auth/logout", None, Some(access)).await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["data"]["revokedTokens"], json!(2));

    for token in [&signup["refreshToken"], &second_device["refreshToken"]] {
        let refresh = app
            .request(
                "POST",
                "/auth/refresh",
                Some(json!({ "refreshToken": token })),
                None,
            )
            .await;
        assert_eq!(refresh.status, StatusCode::UNAUTHORIZED);
    }

    // Logging out again is harmless.
    let again = app.request("POST", "/auth/logout", None, Some(access)).await;
    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(again.body["data"]["revokedTokens"], json!(0));
}

#[tokio::test]
async fn test_admin_logout_ends_session() {
    let app = TestApp::new().await;
    app.create_admin("9100000005", &["SUPER_ADMIN"]).await;
    let access = app.access_token("9100000005").await;

    let response = app.request("POST", "/auth/logout", None, Some(&access)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["terminatedSessions"], json!(1));

    let me = app.request("GET", "/auth/me", None, Some(&access)).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_requires_bearer_token() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/auth/me", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let garbage = app.request("GET", "/auth/me", None, Some("not-a-jwt")).await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_route_uses_envelope() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/nope", None, None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["success"], json!(false));
    assert_eq!(response.body["statusCode"], json!(404));
}

#[tokio::test]
async fn test_health_reports_connected_store() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], json!("ok"));
    assert_eq!(response.body["data"]["database"], json!("connected"));
}
