//! Permission checks against the permissions carried by a principal.

use workgrid_core::error::AppError;

/// Returns `Ok(())` if `permission` was granted, `Forbidden` otherwise.
pub fn require_permission(granted: &[String], permission: &str) -> Result<(), AppError> {
    if granted.iter().any(|p| p == permission) {
        Ok(())
    } else {
        Err(AppError::forbidden(format!(
            "Missing required permission '{permission}'"
        )))
    }
}

/// Returns `Ok(())` if at least one of `permissions` was granted.
pub fn require_any_permission(granted: &[String], permissions: &[&str]) -> Result<(), AppError> {
    if permissions
        .iter()
        .any(|needed| granted.iter().any(|p| p == needed))
    {
        Ok(())
    } else {
        Err(AppError::forbidden(format!(
            "Missing one of the required permissions: {}",
            permissions.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workgrid_core::error::ErrorKind;

    #[test]
    fn test_require_permission() {
        let granted = vec!["roles:read".to_string()];
        assert!(require_permission(&granted, "roles:read").is_ok());
        let err = require_permission(&granted, "roles:write").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }

    #[test]
    fn test_require_any_permission() {
        let granted = vec!["team:read".to_string()];
        assert!(require_any_permission(&granted, &["users:read", "team:read"]).is_ok());
        assert!(require_any_permission(&granted, &["users:read"]).is_err());
        assert!(require_any_permission(&[], &["users:read"]).is_err());
    }
}
