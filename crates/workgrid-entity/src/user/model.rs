//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::UserStatus;
use super::user_type::UserType;

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Ten-digit phone number, globally unique.
    pub phone: String,
    /// Email address (optional, unique when present).
    pub email: Option<String>,
    /// Argon2 password hash.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Actor type.
    pub user_type: UserType,
    /// Account status.
    pub status: UserStatus,
    /// Whether the phone number has been verified.
    pub is_phone_verified: bool,
    /// Whether the email address has been verified.
    pub is_email_verified: bool,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
    /// Soft-delete marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if the user has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Check if the user can log in right now.
    pub fn can_login(&self) -> bool {
        !self.is_deleted() && self.status.can_login()
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Ten-digit phone number.
    pub phone: String,
    /// Email address (optional).
    pub email: Option<String>,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Actor type.
    pub user_type: UserType,
}
