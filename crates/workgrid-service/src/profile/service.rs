//! SP profile maintenance and KYC auto-advance.

use tracing::info;

use workgrid_auth::rbac::catalog;
use workgrid_core::error::AppError;
use workgrid_core::result::AppResult;
use workgrid_database::Stores;
use workgrid_entity::profile::{SpProfile, UpdateSpProfile};
use workgrid_entity::user::UserType;

use crate::context::RequestContext;

/// Lets users maintain their own profile.
#[derive(Debug, Clone)]
pub struct ProfileService {
    stores: Stores,
}

impl ProfileService {
    /// Creates a new profile service.
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// Merges `update` into the caller's SP profile.
    ///
    /// A profile at `PROFILE_INCOMPLETE` moves to `KYC_PENDING` on the update
    /// that makes every required field present, and not before.
    pub async fn update_sp_profile(
        &self,
        ctx: &RequestContext,
        update: UpdateSpProfile,
    ) -> AppResult<SpProfile> {
        if ctx.user_type != UserType::Sp {
            return Err(AppError::forbidden("Only service providers have an SP profile"));
        }
        ctx.require(catalog::PROFILE_WRITE)?;

        let mut profile = self
            .stores
            .accounts
            .find_sp_profile(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("SP profile not found"))?;

        let advanced = profile.apply_update(update);
        self.stores.accounts.save_sp_profile(&profile).await?;

        if advanced {
            info!(user_id = %ctx.user_id, kyc_status = ?profile.kyc_status, "SP profile complete; KYC pending");
        }
        Ok(profile)
    }
}
