//! Client error types.

use thiserror::Error;

use crate::cookies::CookieError;

/// Returned by every auth call of the example-mode client that would mutate state.
pub const AUTH_EXAMPLE_MODE_MESSAGE: &str = "Example mode - no real authentication";

/// Returned by every table write of the example-mode client.
pub const DATABASE_EXAMPLE_MODE_MESSAGE: &str = "Example mode - no real database";

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The operation is unavailable because no real backend is configured.
    #[error("{0}")]
    ExampleMode(&'static str),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("Auth session missing!")]
    NotAuthenticated,

    #[error("invalid access token: {0}")]
    InvalidToken(String),

    #[error("invalid response: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Cookie(#[from] CookieError),
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ClientError::Validation(errors.to_string())
    }
}

impl ClientError {
    /// HTTP status of an API error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
