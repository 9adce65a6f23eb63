//! Process-local store implementing every store trait.
//!
//! Each operation takes the single lock for its whole duration, which gives
//! multi-step writes such as account creation the same all-or-nothing
//! behavior as a database transaction. Suitable for tests and single-node
//! demos only.

mod account;
mod audit;
mod role;
mod token;

use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use workgrid_core::types::pagination::PageRequest;
use workgrid_entity::audit::AuditLogEntry;
use workgrid_entity::profile::{AdminProfile, ClientProfile, SpProfile};
use workgrid_entity::role::{Permission, PermissionGroup, Role, RolePermission, UserRole};
use workgrid_entity::session::{AdminSession, RefreshTokenRecord};
use workgrid_entity::tenant::Tenant;
use workgrid_entity::user::User;

#[derive(Debug, Default)]
struct State {
    users: HashMap<Uuid, User>,
    tenants: HashMap<Uuid, Tenant>,
    client_profiles: HashMap<Uuid, ClientProfile>,
    sp_profiles: HashMap<Uuid, SpProfile>,
    admin_profiles: HashMap<Uuid, AdminProfile>,
    roles: HashMap<Uuid, Role>,
    permissions: HashMap<Uuid, Permission>,
    permission_groups: HashMap<Uuid, PermissionGroup>,
    role_permissions: HashMap<(Uuid, Uuid), RolePermission>,
    user_roles: HashMap<Uuid, UserRole>,
    /// Keyed by token hash.
    refresh_tokens: HashMap<String, RefreshTokenRecord>,
    admin_sessions: HashMap<Uuid, AdminSession>,
    audit_logs: Vec<AuditLogEntry>,
}

/// In-memory implementation of every store trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Cut one page out of an already filtered and ordered list.
fn paginate<T>(items: Vec<T>, page: PageRequest) -> (Vec<T>, u64) {
    let total = items.len() as u64;
    let page_items = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .collect();
    (page_items, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate() {
        let (items, total) = paginate((1..=25).collect::<Vec<_>>(), PageRequest::new(3, 10));
        assert_eq!(total, 25);
        assert_eq!(items, vec![21, 22, 23, 24, 25]);
    }
}
