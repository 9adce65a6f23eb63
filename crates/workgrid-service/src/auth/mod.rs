//! Signup, login, role selection, refresh, logout and the current user.

pub mod service;

pub use service::{
    AuthResult, AuthService, LoginResult, RoleSelectionChallenge, SignupRequest, UserDetail,
};
