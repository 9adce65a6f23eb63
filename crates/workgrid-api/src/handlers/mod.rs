//! Route handlers organized by domain.

pub mod admin;
pub mod auth;
pub mod health;
pub mod permissions;
pub mod profile;
pub mod roles;
pub mod team;
