//! Login, role selection, refresh rotation and logout.

pub mod manager;
pub mod token_hash;

pub use manager::{AuthSession, ClientInfo, LoginOutcome, LogoutReport, SessionManager};
pub use token_hash::hash_token;
