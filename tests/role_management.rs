//! Integration tests for role and permission administration.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::TestApp;

async fn super_admin(app: &TestApp) -> String {
    app.create_admin("9200000001", &["SUPER_ADMIN"]).await;
    app.access_token("9200000001").await
}

#[tokio::test]
async fn test_create_role_and_batch_assign_permissions() {
    let app = TestApp::new().await;
    let token = super_admin(&app).await;

    let created = app
        .request(
            "POST",
            "/roles",
            Some(json!({
                "name": "FIELD_LEAD",
                "displayName": "Field Lead",
                "actorType": "SP",
            })),
            Some(&token),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.body);
    assert_eq!(created.body["data"]["isSystem"], json!(false));
    let role_id = created.body["data"]["id"].as_str().unwrap().to_string();

    let jobs_read = app.permission_id("jobs:read").await;
    let jobs_accept = app.permission_id("jobs:accept").await;
    let path = format!("/roles/{role_id}/permissions");

    let first = app
        .request(
            "POST",
            &path,
            Some(json!({ "permissionIds": [jobs_read, jobs_accept] })),
            Some(&token),
        )
        .await;
    assert_eq!(first.status, StatusCode::OK, "{:?}", first.body);
    assert_eq!(first.body["data"]["count"], json!(2));

    let again = app
        .request(
            "POST",
            &path,
            Some(json!({ "permissionIds": [jobs_read] })),
            Some(&token),
        )
        .await;
    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(again.body["data"]["count"], json!(0));

    let listed = app.request("GET", &path, None, Some(&token)).await;
    assert_eq!(listed.body["data"].as_array().unwrap().len(), 2);

    let revoked = app
        .request(
            "DELETE",
            &path,
            Some(json!({ "permissionIds": [jobs_read] })),
            Some(&token),
        )
        .await;
    assert_eq!(revoked.body["data"]["count"], json!(1));

    let revoked_again = app
        .request(
            "DELETE",
            &path,
            Some(json!({ "permissionIds": [jobs_read] })),
            Some(&token),
        )
        .await;
    assert_eq!(revoked_again.body["data"]["count"], json!(0));
}

#[tokio::test]
async fn test_assign_unknown_permission_names_missing_ids() {
    let app = TestApp::new().await;
    let token = super_admin(&app).await;
    let role_id = app.role_id("SP_BASIC").await;
    let missing = uuid::Uuid::new_v4();

    let response = app
        .request(
            "POST",
            &format!("/roles/{role_id}/permissions"),
            Some(json!({ "permissionIds": [missing] })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let errors = response.body["errors"].as_array().unwrap();
    assert!(errors[0].as_str().unwrap().contains(&missing.to_string()));
}

#[tokio::test]
async fn test_invalid_role_name_rejected() {
    let app = TestApp::new().await;
    let token = super_admin(&app).await;

    let response = app
        .request(
            "POST",
            "/roles",
            Some(json!({
                "name": "field-lead",
                "displayName": "Field Lead",
                "actorType": "SP",
            })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["errors"][0].as_str().unwrap().starts_with("name:"));
}

#[tokio::test]
async fn test_duplicate_role_name_conflicts() {
    let app = TestApp::new().await;
    let token = super_admin(&app).await;

    let response = app
        .request(
            "POST",
            "/roles",
            Some(json!({
                "name": "SP_BASIC",
                "displayName": "Copy",
                "actorType": "SP",
            })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_system_role_cannot_be_deleted() {
    let app = TestApp::new().await;
    let token = super_admin(&app).await;
    let role_id = app.role_id("CLIENT_MEMBER").await;

    let response = app
        .request("DELETE", &format!("/roles/{role_id}"), None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_parent_id_null_clears_and_absent_keeps() {
    let app = TestApp::new().await;
    let token = super_admin(&app).await;
    let parent = app.role_id("SP_BASIC").await;

    let created = app
        .request(
            "POST",
            "/roles",
            Some(json!({
                "name": "SP_SENIOR",
                "displayName": "Senior SP",
                "actorType": "SP",
                "parentId": parent,
            })),
            Some(&token),
        )
        .await;
    let role_id = created.body["data"]["id"].as_str().unwrap().to_string();
    let path = format!("/roles/{role_id}");

    let renamed = app
        .request(
            "PATCH",
            &path,
            Some(json!({ "displayName": "Senior Provider" })),
            Some(&token),
        )
        .await;
    assert_eq!(renamed.status, StatusCode::OK, "{:?}", renamed.body);
    assert_eq!(renamed.body["data"]["parentId"], json!(parent));

    let cleared = app
        .request("PATCH", &path, Some(json!({ "parentId": null })), Some(&token))
        .await;
    assert_eq!(cleared.body["data"]["parentId"], json!(null));

    let deleted = app.request("DELETE", &path, None, Some(&token)).await;
    assert_eq!(deleted.status, StatusCode::OK);
    let gone = app.request("GET", &path, None, Some(&token)).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_role_listing_is_paginated() {
    let app = TestApp::new().await;
    let token = super_admin(&app).await;

    let response = app
        .request("GET", "/roles?page=1&limit=2", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    let data = &response.body["data"];
    assert_eq!(data["items"].as_array().unwrap().len(), 2);
    assert_eq!(data["meta"]["limit"], json!(2));
    assert_eq!(data["meta"]["total"], json!(6));
    assert_eq!(data["meta"]["totalPages"], json!(3));
    assert_eq!(data["meta"]["hasNextPage"], json!(true));
    assert_eq!(data["meta"]["hasPreviousPage"], json!(false));
}

#[tokio::test]
async fn test_huge_page_number_returns_empty_page() {
    let app = TestApp::new().await;
    let token = super_admin(&app).await;

    let response = app
        .request(
            "GET",
            "/roles?page=18446744073709551615&limit=100",
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["data"]["items"], json!([]));
    assert_eq!(response.body["data"]["meta"]["total"], json!(6));
    assert_eq!(response.body["data"]["meta"]["hasNextPage"], json!(false));
}

#[tokio::test]
async fn test_read_only_admin_cannot_write_roles() {
    let app = TestApp::new().await;
    app.create_admin("9200000002", &["SUPPORT_ADMIN"]).await;
    let token = app.access_token("9200000002").await;

    let listed = app.request("GET", "/roles", None, Some(&token)).await;
    assert_eq!(listed.status, StatusCode::OK);

    let response = app
        .request(
            "POST",
            "/roles",
            Some(json!({
                "name": "NOPE",
                "displayName": "Nope",
                "actorType": "SP",
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_permissions_and_groups() {
    let app = TestApp::new().await;
    let token = super_admin(&app).await;

    let group = app
        .request(
            "POST",
            "/permissions/groups",
            Some(json!({ "name": "billing", "displayName": "Billing" })),
            Some(&token),
        )
        .await;
    assert_eq!(group.status, StatusCode::CREATED, "{:?}", group.body);
    let group_id = group.body["data"]["id"].as_str().unwrap().to_string();

    let created = app
        .request(
            "POST",
            "/permissions",
            Some(json!({ "name": "invoices:read", "groupId": group_id })),
            Some(&token),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.body);

    let filtered = app
        .request(
            "GET",
            &format!("/permissions?groupId={group_id}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(filtered.status, StatusCode::OK, "{:?}", filtered.body);
    let items = filtered.body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], json!("invoices:read"));

    let bad_name = app
        .request(
            "POST",
            "/permissions",
            Some(json!({ "name": "Invoices Read" })),
            Some(&token),
        )
        .await;
    assert_eq!(bad_name.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_role_changes_reach_next_refresh() {
    let app = TestApp::new().await;
    let token = super_admin(&app).await;
    let signup = app.signup("9200000003", "SP", None).await;
    let sp_role = app.role_id("SP_BASIC").await;
    let jobs_write = app.permission_id("jobs:write").await;

    app.request(
        "POST",
        &format!("/roles/{sp_role}/permissions"),
        Some(json!({ "permissionIds": [jobs_write] })),
        Some(&token),
    )
    .await;

    let refreshed = app
        .request(
            "POST",
            "/auth/refresh",
            Some(json!({ "refreshToken": signup["refreshToken"] })),
            None,
        )
        .await;
    let permissions: Vec<String> =
        serde_json::from_value(refreshed.body["data"]["user"]["permissions"].clone()).unwrap();
    assert!(permissions.contains(&"jobs:write".to_string()));
}
