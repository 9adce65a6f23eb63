//! # workgrid-entity
//!
//! Domain entity models for WorkGrid. Every struct in this crate represents
//! a database table row or a domain value object. Database entities derive
//! `sqlx::FromRow` and serialize with camelCase field names, which is the
//! shape the HTTP API exposes.

pub mod audit;
pub mod profile;
pub mod role;
pub mod session;
pub mod tenant;
pub mod user;
