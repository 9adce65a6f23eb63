//! Route definitions for the WorkGrid HTTP API.
//!
//! The router receives `AppState` and passes it to all handlers via Axum's
//! `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
};
use tower_http::trace::TraceLayer;

use crate::dto::ApiResponse;
use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;
    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    Router::new()
        .merge(auth_routes())
        .merge(role_routes())
        .merge(permission_routes())
        .merge(admin_routes())
        .merge(team_routes())
        .merge(profile_routes())
        .route("/health", get(handlers::health::health))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

async fn not_found() -> ApiResponse<()> {
    ApiResponse::error(StatusCode::NOT_FOUND, "Route not found", None)
}

/// Signup, login, role selection, refresh, logout, me
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(handlers::auth::signup))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/admin/select-role", post(handlers::auth::select_role))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me))
}

fn role_routes() -> Router<AppState> {
    use handlers::roles;

    Router::new()
        .route("/roles", get(roles::list_roles).post(roles::create_role))
        .route(
            "/roles/{id}",
            get(roles::get_role)
                .patch(roles::update_role)
                .delete(roles::delete_role),
        )
        .route(
            "/roles/{id}/permissions",
            get(roles::role_permissions)
                .post(roles::assign_permissions)
                .delete(roles::revoke_permissions),
        )
}

fn permission_routes() -> Router<AppState> {
    use handlers::permissions;

    Router::new()
        .route(
            "/permissions",
            get(permissions::list_permissions).post(permissions::create_permission),
        )
        .route(
            "/permissions/groups",
            get(permissions::list_groups).post(permissions::create_group),
        )
        .route(
            "/permissions/{id}",
            get(permissions::get_permission)
                .patch(permissions::update_permission)
                .delete(permissions::delete_permission),
        )
}

/// User administration and the audit trail
fn admin_routes() -> Router<AppState> {
    use handlers::admin::{audit, users};

    Router::new()
        .route("/admin/users", get(users::list_users).post(users::create_user))
        .route(
            "/admin/users/{id}",
            get(users::get_user).delete(users::delete_user),
        )
        .route(
            "/admin/users/{id}/roles",
            get(users::list_user_roles).post(users::assign_role),
        )
        .route(
            "/admin/users/{id}/roles/{role_id}",
            delete(users::revoke_role),
        )
        .route("/admin/audit-logs", get(audit::list_audit_logs))
}

fn team_routes() -> Router<AppState> {
    Router::new().route("/team/members", post(handlers::team::create_member))
}

fn profile_routes() -> Router<AppState> {
    Router::new().route(
        "/profile/sp",
        patch(handlers::profile::update_sp_profile),
    )
}
