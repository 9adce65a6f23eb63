//! One-to-one profile extensions of [`User`](crate::user::User).

pub mod admin;
pub mod client;
pub mod sp;

use serde::{Deserialize, Serialize};

pub use admin::AdminProfile;
pub use client::ClientProfile;
pub use sp::{Gender, KycStatus, SpProfile, UpdateSpProfile};

/// Whichever profile a user owns, depending on their actor type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Profile {
    /// Profile of a CLIENT user.
    Client(ClientProfile),
    /// Profile of an SP user.
    Sp(SpProfile),
    /// Profile of an ADMIN user.
    Admin(AdminProfile),
}

impl Profile {
    /// Tenant the profile belongs to, if any.
    pub fn tenant_id(&self) -> Option<uuid::Uuid> {
        match self {
            Self::Client(p) => Some(p.tenant_id),
            _ => None,
        }
    }
}
