//! Wire types of the endpoints the client calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `{success, data, message, statusCode, errors?}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
    pub status_code: u16,
    #[serde(default)]
    pub errors: Option<Vec<String>>,
}

/// `{id, name, displayName}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSummary {
    pub id: Uuid,
    pub name: String,
    pub display_name: String,
}

/// The parts of a user detail the client keeps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub phone: String,
    pub user_type: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub tenant_id: Option<Uuid>,
}

/// Tokens plus the user they belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub user: UserSummary,
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
    #[serde(default)]
    pub selected_role: Option<RoleSummary>,
}

/// A multi-role admin must pick a role with this temp token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleChallenge {
    pub temp_token: String,
    pub expires_at: DateTime<Utc>,
    pub available_roles: Vec<RoleSummary>,
}

/// Body of `POST /auth/signup`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupInput {
    pub phone: String,
    pub email: Option<String>,
    pub password: String,
    pub user_type: String,
    pub full_name: Option<String>,
    pub company_name: Option<String>,
}

/// What `POST /auth/login` returns.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginPayload {
    Authenticated(AuthPayload),
    RoleSelectionRequired(RoleChallenge),
}

impl<'de> Deserialize<'de> for LoginPayload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        let requires_selection = value
            .get("requiresRoleSelection")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        if requires_selection {
            serde_json::from_value(value)
                .map(Self::RoleSelectionRequired)
                .map_err(serde::de::Error::custom)
        } else {
            serde_json::from_value(value)
                .map(Self::Authenticated)
                .map_err(serde::de::Error::custom)
        }
    }
}
