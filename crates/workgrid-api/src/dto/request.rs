//! Request DTOs with validation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use workgrid_entity::profile::{Gender, UpdateSpProfile};
use workgrid_entity::user::UserType;
use workgrid_service::auth::SignupRequest as SvcSignup;
use workgrid_service::role::{
    CreatePermissionGroupRequest, CreatePermissionRequest as SvcCreatePermission,
    CreateRoleRequest as SvcCreateRole, UpdatePermissionRequest as SvcUpdatePermission,
    UpdateRoleRequest as SvcUpdateRole,
};
use workgrid_service::user::{AssignRoleRequest as SvcAssignRole, CreateTeamMemberRequest, NewUserRequest};

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if workgrid_service::user::is_valid_phone(phone) {
        Ok(())
    } else {
        Err(ValidationError::new("phone").with_message("must be exactly 10 digits".into()))
    }
}

fn validate_role_name(name: &str) -> Result<(), ValidationError> {
    if workgrid_entity::role::is_valid_role_name(name) {
        Ok(())
    } else {
        Err(ValidationError::new("role_name")
            .with_message("must be UPPER_SNAKE_CASE (A-Z, 0-9, _)".into()))
    }
}

fn validate_permission_name(name: &str) -> Result<(), ValidationError> {
    if workgrid_entity::role::is_valid_permission_name(name) {
        Ok(())
    } else {
        Err(ValidationError::new("permission_name")
            .with_message("must look like namespace:action (lowercase)".into()))
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// `POST /auth/signup`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
    pub user_type: UserType,
    #[validate(length(min = 1, max = 200))]
    pub full_name: Option<String>,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub company_name: Option<String>,
}

impl From<SignupRequest> for SvcSignup {
    fn from(req: SignupRequest) -> Self {
        Self {
            phone: req.phone,
            email: req.email,
            password: req.password,
            user_type: req.user_type,
            full_name: req.full_name,
            company_name: req.company_name,
        }
    }
}

/// `POST /auth/login`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

/// `POST /auth/admin/select-role`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SelectRoleRequest {
    pub role_id: Uuid,
}

/// `POST /auth/refresh`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub refresh_token: String,
}

/// `POST /roles`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleRequest {
    #[validate(custom(function = "validate_role_name"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub display_name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub actor_type: UserType,
    pub parent_id: Option<Uuid>,
}

impl From<CreateRoleRequest> for SvcCreateRole {
    fn from(req: CreateRoleRequest) -> Self {
        Self {
            name: req.name,
            display_name: req.display_name,
            description: req.description,
            actor_type: req.actor_type,
            parent_id: req.parent_id,
        }
    }
}

/// `PATCH /roles/{id}`. An explicit `"parentId": null` clears the parent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub display_name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<Uuid>>,
}

impl From<UpdateRoleRequest> for SvcUpdateRole {
    fn from(req: UpdateRoleRequest) -> Self {
        Self {
            display_name: req.display_name,
            description: req.description,
            is_active: req.is_active,
            parent_id: req.parent_id,
        }
    }
}

/// `POST|DELETE /roles/{id}/permissions`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PermissionIdsRequest {
    #[validate(length(min = 1, max = 500, message = "must contain 1-500 ids"))]
    pub permission_ids: Vec<Uuid>,
}

/// `POST /permissions`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePermissionRequest {
    #[validate(custom(function = "validate_permission_name"))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub group_id: Option<Uuid>,
}

impl From<CreatePermissionRequest> for SvcCreatePermission {
    fn from(req: CreatePermissionRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            group_id: req.group_id,
        }
    }
}

/// `PATCH /permissions/{id}`. An explicit `"groupId": null` ungroups it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePermissionRequest {
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub group_id: Option<Option<Uuid>>,
}

impl From<UpdatePermissionRequest> for SvcUpdatePermission {
    fn from(req: UpdatePermissionRequest) -> Self {
        Self {
            description: req.description,
            group_id: req.group_id,
        }
    }
}

/// `POST /permissions/groups`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = 64, message = "must be 1-64 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub display_name: String,
}

impl From<CreateGroupRequest> for CreatePermissionGroupRequest {
    fn from(req: CreateGroupRequest) -> Self {
        Self {
            name: req.name,
            display_name: req.display_name,
        }
    }
}

/// `POST /admin/users`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
    pub user_type: UserType,
    #[validate(length(min = 1, max = 200))]
    pub full_name: Option<String>,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub company_name: Option<String>,
    /// Roles to grant; the actor type's default role when empty.
    #[serde(default)]
    pub role_ids: Vec<Uuid>,
}

impl CreateUserRequest {
    /// Splits into the account to create and the roles to grant.
    pub fn into_parts(self) -> (NewUserRequest, Vec<Uuid>) {
        (
            NewUserRequest {
                phone: self.phone,
                email: self.email,
                password: self.password,
                user_type: self.user_type,
                full_name: self.full_name,
                company_name: self.company_name,
            },
            self.role_ids,
        )
    }
}

/// `POST /admin/users/{id}/roles`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignRoleRequest {
    pub role_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<AssignRoleRequest> for SvcAssignRole {
    fn from(req: AssignRoleRequest) -> Self {
        Self {
            role_id: req.role_id,
            tenant_id: req.tenant_id,
            expires_at: req.expires_at,
        }
    }
}

/// `POST /team/members`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberRequest {
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
    #[validate(length(min = 1, max = 200))]
    pub full_name: Option<String>,
}

impl From<TeamMemberRequest> for CreateTeamMemberRequest {
    fn from(req: TeamMemberRequest) -> Self {
        Self {
            phone: req.phone,
            email: req.email,
            password: req.password,
            full_name: req.full_name,
        }
    }
}

/// `PATCH /profile/sp`
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSpProfileRequest {
    #[validate(length(min = 1, max = 200))]
    pub full_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub state: Option<String>,
    #[validate(length(equal = 6, message = "must be 6 digits"))]
    pub pincode: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
}

impl From<UpdateSpProfileRequest> for UpdateSpProfile {
    fn from(req: UpdateSpProfileRequest) -> Self {
        Self {
            full_name: req.full_name,
            city: req.city,
            state: req.state,
            pincode: req.pincode,
            gender: req.gender,
            date_of_birth: req.date_of_birth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_validation_messages() {
        let req: SignupRequest = serde_json::from_value(serde_json::json!({
            "phone": "12345",
            "password": "short",
            "userType": "SP",
            "email": "not-an-email"
        }))
        .unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("phone"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn test_parent_id_null_vs_absent() {
        let absent: UpdateRoleRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.parent_id, None);

        let cleared: UpdateRoleRequest = serde_json::from_str(r#"{"parentId":null}"#).unwrap();
        assert_eq!(cleared.parent_id, Some(None));
    }
}
