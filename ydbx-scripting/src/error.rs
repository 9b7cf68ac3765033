//! Error types for scripting client operations.

use thiserror::Error;

/// Result type for scripting client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while building or using a scripting client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The underlying client could not be constructed.
    #[error("Failed to construct client: {0}")]
    Construction(String),

    /// Transport-level failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// No endpoint could serve the request.
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// The server asked the client to back off.
    #[error("Server overloaded: {0}")]
    Overloaded(String),

    /// Operation deadline exceeded.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// The server-side session is no longer valid.
    #[error("Bad session: {0}")]
    BadSession(String),

    /// The query itself was rejected.
    #[error("Query error: {0}")]
    Query(String),

    /// Closing the underlying client failed.
    #[error("Close error: {0}")]
    Close(String),

    /// The caller cancelled the operation.
    #[error("Operation cancelled")]
    Cancelled,

    /// The client has been closed.
    #[error("Client is closed")]
    Closed,
}

impl ClientError {
    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Create a construction error.
    pub fn construction(msg: impl Into<String>) -> Self {
        Self::Construction(msg.into())
    }

    /// Check if error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport(_)
                | Self::Unavailable(_)
                | Self::Overloaded(_)
                | Self::Timeout(_)
                | Self::BadSession(_)
        )
    }

    /// Check if error is a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Check if error is transport related.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Unavailable(_))
    }

    /// Check if the caller cancelled the operation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_retryable() {
        assert!(ClientError::transport("reset").is_retryable());
        assert!(ClientError::Overloaded("busy".into()).is_retryable());
        assert!(ClientError::BadSession("gone".into()).is_retryable());
        assert!(!ClientError::query("syntax").is_retryable());
        assert!(!ClientError::Cancelled.is_retryable());
        assert!(!ClientError::Closed.is_retryable());
        assert!(!ClientError::construction("boom").is_retryable());
    }

    #[test]
    fn test_error_kinds() {
        assert!(ClientError::Timeout("1s".into()).is_timeout());
        assert!(ClientError::Unavailable("x".into()).is_transport());
        assert!(ClientError::Cancelled.is_cancelled());
        assert!(!ClientError::Closed.is_cancelled());
    }
}
