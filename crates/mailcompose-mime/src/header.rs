//! Custom header handling.

use crate::encoding::encode_rfc2047;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use std::fmt;

/// Fields the message writes itself; compared case-insensitively.
const RESERVED_NAMES: &[&str] = &[
    "Date",
    "From",
    "To",
    "Cc",
    "Bcc",
    "Reply-To",
    "Subject",
    "MIME-Version",
    "Content-Type",
    "Content-Transfer-Encoding",
];

/// Ordered collection of custom message headers.
///
/// Names are matched exactly (case-sensitive). Adding a name that is
/// already present replaces its value but keeps its original position.
/// Names of fields the message renders itself (`From`, `Subject`,
/// `Content-Type`, ...) are refused in any letter case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Headers {
    headers: IndexMap<String, String>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header, replacing the value of an existing header with the same name.
    ///
    /// The collection is left untouched when validation fails.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidHeaderName`] if `name` is empty or contains characters
    ///   outside printable ASCII, or a colon.
    /// - [`Error::ReservedHeaderName`] if `name` is a field the message writes itself.
    /// - [`Error::InvalidHeaderValue`] if `value` is empty or contains a line break.
    pub fn add(&mut self, name: &str, value: &str) -> Result<()> {
        validate_name(name)?;
        validate_value(name, value)?;

        if let Some(previous) = self.headers.insert(name.to_string(), value.to_string()) {
            tracing::debug!(header = name, %previous, "replaced header value");
        }
        Ok(())
    }

    /// Gets the value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Checks whether a header is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    /// Number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Returns true if no headers have been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Renders the headers as wire lines, RFC 2047 encoding non-ASCII values
    /// in `charset`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEncoding`] if the charset is unknown or cannot
    /// represent a value.
    pub fn encode(&self, charset: &str) -> Result<String> {
        let mut out = String::new();
        for (name, value) in self.iter() {
            out.push_str(name);
            out.push_str(": ");
            out.push_str(&encode_rfc2047(value, charset)?);
            out.push_str("\r\n");
        }
        Ok(out)
    }

    /// Returns an iterator over all headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            write!(f, "{name}: {value}\r\n")?;
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<()> {
    // RFC 5322 field-name: printable ASCII except ':'
    if name.is_empty() || !name.bytes().all(|b| (33..=126).contains(&b) && b != b':') {
        return Err(Error::InvalidHeaderName);
    }
    if RESERVED_NAMES.iter().any(|r| r.eq_ignore_ascii_case(name)) {
        return Err(Error::ReservedHeaderName(name.to_string()));
    }
    Ok(())
}

fn validate_value(name: &str, value: &str) -> Result<()> {
    if value.is_empty() || value.contains(['\r', '\n']) {
        return Err(Error::InvalidHeaderValue(name.to_string()));
    }
    Ok(())
}
