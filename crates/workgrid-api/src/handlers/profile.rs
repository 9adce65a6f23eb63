//! Profile handlers.

use axum::extract::State;

use workgrid_entity::profile::SpProfile;

use crate::dto::request::UpdateSpProfileRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// PATCH /profile/sp
pub async fn update_sp_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<UpdateSpProfileRequest>,
) -> ApiResult<ApiResponse<SpProfile>> {
    let profile = state
        .profile_service
        .update_sp_profile(&auth, req.into())
        .await?;
    Ok(ApiResponse::ok_with_message(profile, "Profile updated"))
}
