//! Refresh-token records and admin sessions.

pub mod admin;
pub mod refresh;

pub use admin::{AdminSession, CreateAdminSession};
pub use refresh::{CreateRefreshToken, RefreshTokenRecord};
