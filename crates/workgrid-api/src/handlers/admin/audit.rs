//! Audit trail queries.

use axum::extract::State;

use workgrid_core::types::pagination::PageResponse;
use workgrid_entity::audit::{AuditFilter, AuditLogEntry};

use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{ApiQuery, AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /admin/audit-logs
pub async fn list_audit_logs(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(filter): ApiQuery<AuditFilter>,
    ApiQuery(page): ApiQuery<PaginationParams>,
) -> ApiResult<ApiResponse<PageResponse<AuditLogEntry>>> {
    let entries = state
        .audit_service
        .search(&auth, filter, page.into_page_request())
        .await?;
    Ok(ApiResponse::ok(entries))
}
