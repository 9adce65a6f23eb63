//! Client tenant team management.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use workgrid_auth::rbac::catalog;
use workgrid_core::error::AppError;
use workgrid_core::result::AppResult;
use workgrid_database::Stores;
use workgrid_entity::audit::AuditAction;
use workgrid_entity::user::{User, UserType};

use super::provision::{AccountProvisioner, NewUserRequest};
use crate::audit::AuditService;
use crate::context::RequestContext;

/// Input for adding a member to the caller's tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamMemberRequest {
    pub phone: String,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password: String,
    pub full_name: Option<String>,
}

/// Lets a client admin grow their tenant's team.
#[derive(Debug, Clone)]
pub struct TeamService {
    stores: Stores,
    provisioner: AccountProvisioner,
    audit: AuditService,
}

impl TeamService {
    /// Creates a new team service.
    pub fn new(stores: Stores, provisioner: AccountProvisioner, audit: AuditService) -> Self {
        Self {
            stores,
            provisioner,
            audit,
        }
    }

    /// Creates a CLIENT user in the caller's tenant holding `CLIENT_MEMBER`
    /// scoped to that tenant. User, profile and role are written atomically.
    pub async fn create_member(
        &self,
        ctx: &RequestContext,
        req: CreateTeamMemberRequest,
    ) -> AppResult<User> {
        ctx.require(catalog::TEAM_WRITE)?;

        let tenant_id = match (ctx.user_type, ctx.tenant_id) {
            (UserType::Client, Some(tenant_id)) => tenant_id,
            _ => {
                return Err(AppError::forbidden(
                    "Only tenant-scoped client users can add team members",
                ));
            }
        };

        let member_role = self
            .stores
            .roles
            .find_role_by_name(catalog::CLIENT_MEMBER)
            .await?
            .ok_or_else(|| {
                AppError::internal(format!("System role {} is not seeded", catalog::CLIENT_MEMBER))
            })?;

        let user = self
            .provisioner
            .provision(
                NewUserRequest {
                    phone: req.phone,
                    email: req.email,
                    password: req.password,
                    user_type: UserType::Client,
                    full_name: req.full_name,
                    company_name: None,
                },
                Some(tenant_id),
                &[member_role.id],
                Some(ctx.user_id),
            )
            .await?;

        self.audit
            .record(
                Some(ctx),
                AuditAction::UserCreate,
                Some(user.id),
                json!({ "tenantId": tenant_id, "roleIds": [member_role.id] }),
            )
            .await?;

        info!(actor_id = %ctx.user_id, tenant_id = %tenant_id, member_id = %user.id, "Team member added");
        Ok(user)
    }
}
