//! PostgreSQL implementations of the store traits.

pub mod account;
pub mod audit;
pub mod role;
pub mod token;

pub use account::PgAccountRepository;
pub use audit::PgAuditRepository;
pub use role::PgRoleRepository;
pub use token::PgTokenRepository;

use workgrid_core::error::{AppError, ErrorKind};

/// Build a mapper from `sqlx::Error` to [`AppError`].
///
/// Unique violations become `Conflict` with a message chosen by constraint
/// name; foreign-key violations become `Validation`. Everything else is a
/// `Database` error carrying `context`.
pub(crate) fn db_err(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return AppError::conflict(conflict_message(db.constraint()));
            }
            if db.is_foreign_key_violation() {
                return AppError::validation("Referenced record does not exist");
            }
        }
        AppError::with_source(ErrorKind::Database, context, e)
    }
}

fn conflict_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("users_phone_key") => "Phone number already registered",
        Some("users_email_key") => "Email already registered",
        Some("roles_name_key") => "Role name already exists",
        Some("permissions_name_key") => "Permission name already exists",
        Some("permission_groups_name_key") => "Permission group name already exists",
        Some("user_roles_scope_key") => "Role already assigned to user",
        _ => "Resource already exists",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_messages() {
        assert_eq!(
            conflict_message(Some("users_phone_key")),
            "Phone number already registered"
        );
        assert_eq!(conflict_message(None), "Resource already exists");
    }
}
