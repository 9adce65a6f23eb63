//! Admin-only endpoints.

pub mod audit;
pub mod users;
