//! Error types for SMTP transport configuration.

/// Result type alias for SMTP transport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SMTP transport error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// No host name was configured.
    #[error("Missing host name")]
    MissingHost,

    /// Host name contains whitespace or control characters.
    #[error("Invalid host name: {0:?}")]
    InvalidHostName(String),
}
