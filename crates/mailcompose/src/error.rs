//! Error types for composing messages.

use thiserror::Error;

/// Errors that can occur while composing a message.
#[derive(Debug, Error)]
pub enum Error {
    /// Address, header, content type, or charset problem.
    #[error(transparent)]
    Mime(#[from] mailcompose_mime::Error),

    /// Transport configuration problem.
    #[error(transparent)]
    Transport(#[from] mailcompose_smtp::Error),

    /// A bulk add was given no addresses.
    #[error("No addresses supplied")]
    NoAddresses,

    /// The message has already been built.
    #[error("Message already built")]
    AlreadyBuilt,

    /// No sender was set before building.
    #[error("Missing sender: From address is required")]
    MissingSender,

    /// No To, Cc, or Bcc recipient was added before building.
    #[error("Missing recipient: at least one To, Cc, or Bcc address is required")]
    MissingRecipient,
}

/// Broad category of an [`Error`], for deciding how to react to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Programmer error, such as a missing required argument. Not retryable.
    Fault,
    /// A single field was malformed; correct it and repeat the call.
    Validation,
    /// The operation is not allowed in the composer's current state.
    IllegalState,
    /// The composition is incomplete; supply the missing field and build again.
    Compose,
}

impl Error {
    /// Returns the category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Mime(e) if e.is_fault() => ErrorKind::Fault,
            Self::Mime(_) | Self::Transport(_) | Self::NoAddresses => ErrorKind::Validation,
            Self::AlreadyBuilt => ErrorKind::IllegalState,
            Self::MissingSender | Self::MissingRecipient => ErrorKind::Compose,
        }
    }

    /// Returns true if this error signals a programmer fault.
    #[must_use]
    pub const fn is_fault(&self) -> bool {
        matches!(self.kind(), ErrorKind::Fault)
    }

    /// Returns true if the caller can fix the input and retry.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Validation | ErrorKind::Compose)
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
