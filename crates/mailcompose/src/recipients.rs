//! Recipient lists.

use crate::error::{Error, Result};
use mailcompose_mime::{Mailbox, RecipientType, parse_address};
use std::fmt;

/// Which list an address belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecipientKind {
    /// Primary recipients.
    To,
    /// Carbon copy.
    Cc,
    /// Blind carbon copy.
    Bcc,
    /// Where replies should be sent.
    ReplyTo,
}

impl RecipientKind {
    /// Recipient category in the assembled message; `None` for Reply-To.
    #[must_use]
    pub const fn recipient_type(self) -> Option<RecipientType> {
        match self {
            Self::To => Some(RecipientType::To),
            Self::Cc => Some(RecipientType::Cc),
            Self::Bcc => Some(RecipientType::Bcc),
            Self::ReplyTo => None,
        }
    }
}

impl fmt::Display for RecipientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::To => f.write_str("To"),
            Self::Cc => f.write_str("Cc"),
            Self::Bcc => f.write_str("Bcc"),
            Self::ReplyTo => f.write_str("Reply-To"),
        }
    }
}

/// Ordered list of validated addresses for one category.
///
/// Insertion order is kept and duplicates are allowed. A failed add never
/// leaves the list partially updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientList {
    kind: RecipientKind,
    addresses: Vec<Mailbox>,
}

impl RecipientList {
    /// Creates an empty list.
    #[must_use]
    pub const fn new(kind: RecipientKind) -> Self {
        Self {
            kind,
            addresses: Vec::new(),
        }
    }

    /// Category of this list.
    #[must_use]
    pub const fn kind(&self) -> RecipientKind {
        self.kind
    }

    /// Validates and appends one address.
    ///
    /// # Errors
    ///
    /// - [`mailcompose_mime::Error::NullArgument`] (a fault) if `email` is `None`.
    /// - [`mailcompose_mime::Error::InvalidAddress`] if `email` is malformed.
    pub fn add_one(
        &mut self,
        email: Option<&str>,
        name: Option<&str>,
        charset: Option<&str>,
    ) -> Result<()> {
        let mailbox = parse_address(email, name, charset)?;
        tracing::debug!(kind = %self.kind, address = mailbox.email(), "added recipient");
        self.addresses.push(mailbox);
        Ok(())
    }

    /// Validates and appends several addresses, all or nothing.
    ///
    /// # Errors
    ///
    /// - [`Error::NoAddresses`] if `emails` is `None` or empty.
    /// - [`mailcompose_mime::Error::InvalidAddress`] for the first malformed
    ///   entry; nothing is appended in that case.
    pub fn add_many<S: AsRef<str>>(&mut self, emails: Option<&[S]>) -> Result<()> {
        let emails = emails.filter(|e| !e.is_empty()).ok_or(Error::NoAddresses)?;

        let parsed = emails
            .iter()
            .map(|email| parse_address(Some(email.as_ref()), None, None))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        tracing::debug!(kind = %self.kind, count = parsed.len(), "added recipients");
        self.addresses.extend(parsed);
        Ok(())
    }

    /// Addresses in insertion order.
    #[must_use]
    pub fn list(&self) -> &[Mailbox] {
        &self.addresses
    }

    /// Number of addresses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// Returns true if no address has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}
