//! User domain entities.

pub mod model;
pub mod status;
pub mod user_type;

pub use model::{CreateUser, User};
pub use status::UserStatus;
pub use user_type::UserType;
