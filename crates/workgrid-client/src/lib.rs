//! # workgrid-client
//!
//! HTTP client for the WorkGrid API.
//!
//! Session state lives in two named stores: [`SessionStore`] holds the full
//! token pair for application logic, and [`CookieMirror`] holds the small
//! projection that edge routing reads from a cookie. [`sync_cookie_mirror`]
//! is the only way the mirror changes. Concurrent token refreshes are
//! coalesced into one network call by [`RefreshCoordinator`].

pub mod client;
pub mod error;
pub mod refresh;
pub mod session;
pub mod types;

pub use client::ApiClient;
pub use error::{ClientError, ClientResult};
pub use refresh::RefreshCoordinator;
pub use session::{AuthCookie, CookieMirror, SessionState, SessionStore, sync_cookie_mirror};
pub use types::{AuthPayload, Envelope, LoginPayload, RoleChallenge, RoleSummary, SignupInput, UserSummary};
