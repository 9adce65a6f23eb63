//! Actor type enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The category of principal a user (and a role) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserType {
    /// A client organization member; always belongs to a tenant.
    Client,
    /// A service provider; goes through KYC before activation.
    Sp,
    /// Platform staff.
    Admin,
    /// An external partner.
    Partner,
}

impl UserType {
    /// Return the type as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "CLIENT",
            Self::Sp => "SP",
            Self::Admin => "ADMIN",
            Self::Partner => "PARTNER",
        }
    }

    /// Check if this is the admin actor type.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether anyone may create an account of this type through public signup.
    pub fn allows_self_signup(&self) -> bool {
        !self.is_admin()
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserType {
    type Err = workgrid_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CLIENT" => Ok(Self::Client),
            "SP" => Ok(Self::Sp),
            "ADMIN" => Ok(Self::Admin),
            "PARTNER" => Ok(Self::Partner),
            _ => Err(workgrid_core::AppError::validation(format!(
                "Invalid user type: '{s}'. Expected one of: CLIENT, SP, ADMIN, PARTNER"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("sp".parse::<UserType>().unwrap(), UserType::Sp);
        assert_eq!("ADMIN".parse::<UserType>().unwrap(), UserType::Admin);
        assert!("root".parse::<UserType>().is_err());
    }

    #[test]
    fn test_serde_wire_format() {
        assert_eq!(serde_json::to_string(&UserType::Partner).unwrap(), "\"PARTNER\"");
        let parsed: UserType = serde_json::from_str("\"CLIENT\"").unwrap();
        assert_eq!(parsed, UserType::Client);
    }

    #[test]
    fn test_admin_cannot_self_signup() {
        assert!(!UserType::Admin.allows_self_signup());
        assert!(UserType::Client.allows_self_signup());
    }
}
