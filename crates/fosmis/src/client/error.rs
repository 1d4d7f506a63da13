//! Error types for FOSMIS portal operations.

use thiserror::Error;

/// Errors surfaced by the portal client.
#[derive(Error, Debug, Clone)]
pub enum FosmisError {
    /// Network/HTTP request failed
    #[error("Network error: {message}")]
    Network { message: String },

    /// The portal rejected the supplied username/password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The portal answered with something we cannot interpret
    #[error("Unexpected response: {message}")]
    UnexpectedResponse { message: String },
}

impl FosmisError {
    /// True when retrying the same call might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FosmisError::Network { .. })
    }
}

impl From<reqwest::Error> for FosmisError {
    fn from(err: reqwest::Error) -> Self {
        FosmisError::Network {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for FosmisError {
    fn from(err: url::ParseError) -> Self {
        FosmisError::UnexpectedResponse {
            message: format!("Invalid URL: {err}"),
        }
    }
}
