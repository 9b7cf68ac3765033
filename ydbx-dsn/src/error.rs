//! Error types for connection string resolution.

use thiserror::Error;

/// Result type for DSN operations.
pub type DsnResult<T> = Result<T, DsnError>;

/// Errors that can occur while resolving a connection string.
///
/// Every variant is a parse error; the variant names the component of the
/// DSN that was rejected. No partial option lists are ever returned
/// alongside one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DsnError {
    /// The input is not a syntactically valid URL.
    #[error("Invalid connection string: {0}")]
    InvalidUrl(String),

    /// The scheme is neither `grpc` nor `grpcs`.
    #[error("Unsupported scheme '{0}' (expected grpc or grpcs)")]
    UnsupportedScheme(String),

    /// The URL has no host component.
    #[error("Connection string has no host: {0}")]
    MissingHost(String),

    /// `query_mode` carries an unknown value.
    #[error("Unknown query mode: {0}")]
    UnknownQueryMode(String),

    /// `go_auto_bind` carries an unknown value.
    #[error("Unknown bind mode: {0}")]
    UnknownBindMode(String),

    /// Environment variable not found.
    #[error("Environment variable not found: {0}")]
    EnvNotFound(String),
}

impl DsnError {
    /// Name of the DSN component that was rejected.
    #[must_use]
    pub fn component(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => "url",
            Self::UnsupportedScheme(_) => "scheme",
            Self::MissingHost(_) => "host",
            Self::UnknownQueryMode(_) => "query_mode",
            Self::UnknownBindMode(_) => "go_auto_bind",
            Self::EnvNotFound(_) => "env",
        }
    }
}

impl From<url::ParseError> for DsnError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}
