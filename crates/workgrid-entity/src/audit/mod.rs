//! Append-only audit trail.

pub mod action;
pub mod model;

pub use action::AuditAction;
pub use model::{AuditFilter, AuditLogEntry, CreateAuditLogEntry};
