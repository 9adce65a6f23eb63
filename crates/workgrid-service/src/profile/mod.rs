//! Self-service profile updates.

pub mod service;

pub use service::ProfileService;
