//! Client error type.

use std::sync::Arc;

use thiserror::Error;

/// Errors surfaced by [`ApiClient`](crate::ApiClient).
///
/// `Clone` so that one refresh failure can be handed to every caller that
/// was waiting on it.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(Arc<reqwest::Error>),

    /// The server answered with an error envelope.
    #[error("{status}: {message}")]
    Api {
        status: u16,
        message: String,
        errors: Vec<String>,
    },

    /// The response body was not the expected envelope.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// No session is stored, or it can no longer be refreshed.
    #[error("not authenticated")]
    NotAuthenticated,
}

impl ClientError {
    /// HTTP status, for API errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server rejected the credentials.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(Arc::new(err))
    }
}

/// Result alias for client calls.
pub type ClientResult<T> = Result<T, ClientError>;
