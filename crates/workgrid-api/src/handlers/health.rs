//! Health check handler.

use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /health
pub async fn health(State(state): State<AppState>) -> ApiResponse<HealthResponse> {
    let reachable = match state.stores.health_check().await {
        Ok(ok) => ok,
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            false
        }
    };

    let body = HealthResponse {
        status: if reachable { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if reachable { "connected" } else { "unreachable" }.to_string(),
    };

    if reachable {
        ApiResponse::ok(body)
    } else {
        ApiResponse {
            success: false,
            data: Some(body),
            message: "Database unreachable".to_string(),
            status_code: StatusCode::SERVICE_UNAVAILABLE.as_u16(),
            errors: None,
        }
    }
}
