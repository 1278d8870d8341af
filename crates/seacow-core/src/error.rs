//! Error types for Seacow.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or missing client input. Surfaced as 400, never retried.
    #[error("{0}")]
    Validation(String),

    /// Missing credential or unusable setting. Raised before any network call.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An LLM provider rejected the request or returned an unusable reply.
    #[error("{provider} error: {message}")]
    Provider { provider: String, message: String },

    /// Search or statistics collaborator failure. Always recovered locally.
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether the caller is at fault (maps to a 4xx).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
