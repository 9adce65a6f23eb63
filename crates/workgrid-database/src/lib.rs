//! # workgrid-database
//!
//! Persistence for WorkGrid. The service layer only sees the store traits
//! in [`store`]; [`Stores`] wires them to either the PostgreSQL repositories
//! or the process-local [`memory::MemoryStore`], depending on
//! `database.provider`.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{
    AccountStore, AuditStore, NewAccount, NewProfile, RoleFilter, RoleStore, Stores, TokenStore,
    UserFilter,
};
