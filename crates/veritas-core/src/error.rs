//! Error types for veritas

use crate::model::ProviderId;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using VeritasError
pub type Result<T> = std::result::Result<T, VeritasError>;

/// Error type alias for convenience
pub type Error = VeritasError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NOT_FOUND: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
}

/// Main error type for veritas
#[derive(Debug, Error)]
pub enum VeritasError {
    /// Provider output could not be decoded as a classification.
    /// `preview` is bounded, never the full text.
    #[error("Parse error: {message} (near: {preview:?})")]
    Parse { message: String, preview: String },

    #[error("Provider {provider} failed: {cause}")]
    Provider { provider: ProviderId, cause: String },

    /// The backend refused the request itself (HTTP 400/422), typically
    /// over an output format or schema it does not accept
    #[error("Provider {provider} rejected the request: {cause}")]
    Rejected { provider: ProviderId, cause: String },

    #[error("Query planning failed: {0}")]
    Planning(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Analysis not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl VeritasError {
    /// Build a provider error from any displayable cause
    pub fn provider(provider: ProviderId, cause: impl std::fmt::Display) -> Self {
        Self::Provider {
            provider,
            cause: cause.to_string(),
        }
    }

    pub fn rejected(provider: ProviderId, cause: impl std::fmt::Display) -> Self {
        Self::Rejected {
            provider,
            cause: cause.to_string(),
        }
    }

    /// Whether a different output mode might get past this error
    pub fn is_rejected_request(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound(_) => exit_codes::NOT_FOUND,
            Self::InvalidRequest(_) | Self::Config(_) => exit_codes::INVALID_INPUT,
            _ => exit_codes::GENERAL_ERROR,
        }
    }
}
