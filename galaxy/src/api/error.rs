use thiserror::Error;

/// Transport-level failures talking to the Galaxy API
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or TLS failure; never retried, surfaced unchanged
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{method} {path}: not found")]
    NotFound { method: String, path: String },

    #[error("{method} {path} returned HTTP {status}: {message}")]
    Remote {
        status: u16,
        method: String,
        path: String,
        message: String,
    },

    /// The remote answered 2xx but the body does not fit the expected shape
    #[error("{method} {path}: unexpected response: {message}")]
    Mapping {
        method: String,
        path: String,
        message: String,
    },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// HTTP status of a remote rejection, if there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}
