//! # workgrid-core
//!
//! Core crate for WorkGrid. Contains configuration schemas, pagination
//! types and the unified error system.
//!
//! This crate has **no** internal dependencies on other WorkGrid crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
