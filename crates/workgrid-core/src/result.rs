//! Convenience result type alias for WorkGrid.

use crate::error::AppError;

/// A specialized `Result` type for WorkGrid operations.
pub type AppResult<T> = Result<T, AppError>;
