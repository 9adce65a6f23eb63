//! JWT token encoding, decoding, and claims.

pub mod claims;
pub mod decoder;
pub mod encoder;

pub use claims::{AccessClaims, ROLE_SELECTION_PURPOSE, RefreshClaims, RoleSelectionClaims, TokenType};
pub use decoder::JwtDecoder;
pub use encoder::{IssuedTokens, JwtEncoder, TokenPair};
