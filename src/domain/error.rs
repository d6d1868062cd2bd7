use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl From<String> for DomainError {
    fn from(s: String) -> Self {
        DomainError::Database(s)
    }
}

impl From<&str> for DomainError {
    fn from(s: &str) -> Self {
        DomainError::InvalidInput(s.to_string())
    }
}

/// Failure of an external collaborator (fetcher, inference, market data, sinks).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CollaboratorError {
    /// HTTP, DNS, rate limiting and other transport failures.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// The collaborator answered, but not in the shape we asked for.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The collaborator is not configured or has no data for the request.
    #[error("Unavailable: {0}")]
    Unavailable(String),
}
