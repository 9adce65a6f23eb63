//! Client team management.

use axum::extract::State;

use workgrid_entity::user::User;

use crate::dto::request::TeamMemberRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /team/members
pub async fn create_member(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<TeamMemberRequest>,
) -> ApiResult<ApiResponse<User>> {
    let user = state.team_service.create_member(&auth, req.into()).await?;
    Ok(ApiResponse::created(user, "Team member created"))
}
