//! Errors raised by resource adapters

use thiserror::Error;
use tfplug::types::Diagnostic;

use crate::api::ApiError;

#[derive(Debug, Error)]
pub enum GalaxyError {
    /// Bad or missing input, detected before any remote call
    #[error("{0}")]
    Configuration(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// A list element the operation would add is already there
    #[error("{0}")]
    Conflict(String),

    /// The remote accepted the mutation but its answer could not be folded.
    /// The identity is known so state can still track the entity.
    #[error("created {id} but could not read the response: {source}")]
    Committed {
        id: String,
        #[source]
        source: ApiError,
    },

    #[error("operation cancelled")]
    Cancelled,
}

impl GalaxyError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GalaxyError::Api(e) if e.is_not_found())
    }

    pub fn missing(attribute: &str) -> Self {
        GalaxyError::Configuration(format!("{} is required", attribute))
    }

    /// Error diagnostic with `summary` naming the operation
    pub fn to_diagnostic(&self, summary: impl Into<String>) -> Diagnostic {
        Diagnostic::error(summary, self.to_string())
    }
}
