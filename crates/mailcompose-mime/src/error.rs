//! Error types for message-format operations.

/// Result type alias for message-format operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Message-format error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A required argument was absent.
    ///
    /// This is a programmer error, not something an end user can correct.
    #[error("Null argument: {0}")]
    NullArgument(&'static str),

    /// Address does not match the `local-part "@" domain` grammar.
    #[error("Malformed address: {0}")]
    InvalidAddress(String),

    /// Header name is empty or not a valid field name.
    #[error("Invalid header name")]
    InvalidHeaderName,

    /// Header name belongs to a field the message renders itself.
    #[error("Reserved header name: {0}")]
    ReservedHeaderName(String),

    /// Header value is empty or contains a line break.
    #[error("Invalid header value for {0}")]
    InvalidHeaderValue(String),

    /// Invalid content type.
    #[error("Invalid content type: {0}")]
    InvalidContentType(String),

    /// Charset label is unknown or text cannot be represented in it.
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),
}

impl Error {
    /// Returns true if this error signals a programmer fault rather than bad input.
    #[must_use]
    pub const fn is_fault(&self) -> bool {
        matches!(self, Self::NullArgument(_))
    }
}
