//! Email address parsing and validation.
//!
//! Addresses are checked against the RFC 5321 mailbox grammar:
//!
//! ```text
//! Mailbox        = Local-part "@" ( Domain / address-literal )
//! Local-part     = Dot-string / Quoted-string
//! Dot-string     = Atom *("." Atom)
//! Domain         = sub-domain *("." sub-domain)
//! sub-domain     = Let-dig [Ldh-str]
//! ```
//!
//! Display names and charsets are attached verbatim; whether the charset
//! can actually encode the name is decided when the message is rendered.

use crate::error::{Error, Result};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

const MAX_ADDRESS_LENGTH: usize = 254;
const MAX_LOCAL_PART_LENGTH: usize = 64;
const MAX_DOMAIN_LENGTH: usize = 255;
const MAX_LABEL_LENGTH: usize = 63;

/// A validated email address with optional display name and charset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mailbox {
    email: String,
    name: Option<String>,
    charset: Option<String>,
}

impl Mailbox {
    /// Parses a bare address with no display name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] if the address is malformed.
    pub fn new(email: &str) -> Result<Self> {
        parse_address(Some(email), None, None)
    }

    /// Parses an address and attaches a display name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] if the address is malformed.
    pub fn with_name(email: &str, name: &str) -> Result<Self> {
        parse_address(Some(email), Some(name), None)
    }

    /// The address exactly as it was supplied.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Display name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Charset used to encode the display name, if any.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    /// Part before the `@`.
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.split().0
    }

    /// Part after the `@`.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.split().1
    }

    fn split(&self) -> (&str, &str) {
        // Validated at construction: the domain never contains '@'.
        self.email
            .rsplit_once('@')
            .unwrap_or((self.email.as_str(), ""))
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) if !name.is_empty() => {
                let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "\"{escaped}\" <{}>", self.email)
            }
            _ => write!(f, "{}", self.email),
        }
    }
}

/// Parses and validates a raw email address.
///
/// `raw` is `None` only through a programmer error, which is reported as
/// [`Error::NullArgument`] so callers can tell it apart from bad input.
///
/// # Errors
///
/// - [`Error::NullArgument`] if `raw` is `None`.
/// - [`Error::InvalidAddress`] if `raw` does not match the mailbox grammar.
pub fn parse_address(
    raw: Option<&str>,
    name: Option<&str>,
    charset: Option<&str>,
) -> Result<Mailbox> {
    let raw = raw.ok_or(Error::NullArgument("email"))?;
    validate(raw).map_err(|reason| {
        tracing::debug!(address = raw, reason, "rejected address");
        Error::InvalidAddress(format!("{raw}: {reason}"))
    })?;

    Ok(Mailbox {
        email: raw.to_string(),
        name: name.map(str::to_string),
        charset: charset.map(str::to_string),
    })
}

/// Returns true if `raw` is a syntactically valid address.
#[must_use]
pub fn is_valid_address(raw: &str) -> bool {
    validate(raw).is_ok()
}

fn validate(raw: &str) -> std::result::Result<(), &'static str> {
    if raw.is_empty() {
        return Err("address is empty");
    }
    if raw.len() > MAX_ADDRESS_LENGTH {
        return Err("address too long");
    }

    let at = find_unquoted_at(raw).ok_or("missing '@'")?;
    let (local, domain) = (&raw[..at], &raw[at + 1..]);

    if local.is_empty() {
        return Err("empty local-part");
    }
    if local.len() > MAX_LOCAL_PART_LENGTH {
        return Err("local-part too long");
    }
    if local.starts_with('"') {
        validate_quoted_string(local)?;
    } else {
        validate_dot_string(local)?;
    }

    if domain.is_empty() {
        return Err("empty domain");
    }
    if domain.len() > MAX_DOMAIN_LENGTH {
        return Err("domain too long");
    }
    if domain.starts_with('[') {
        validate_address_literal(domain)
    } else {
        validate_domain(domain)
    }
}

/// Position of the '@' that is outside any quoted string.
fn find_unquoted_at(input: &str) -> Option<usize> {
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, ch) in input.char_indices() {
        match ch {
            '\\' if in_quotes && !escaped => {
                escaped = true;
                continue;
            }
            '"' if !escaped => in_quotes = !in_quotes,
            '@' if !in_quotes => return Some(i),
            _ => {}
        }
        escaped = false;
    }

    None
}

fn validate_dot_string(local: &str) -> std::result::Result<(), &'static str> {
    for atom in local.split('.') {
        if atom.is_empty() {
            return Err("empty atom in local-part");
        }
        if !atom.chars().all(is_atext) {
            return Err("invalid character in local-part");
        }
    }
    Ok(())
}

fn validate_quoted_string(local: &str) -> std::result::Result<(), &'static str> {
    if local.len() < 2 || !local.ends_with('"') {
        return Err("unclosed quoted local-part");
    }

    let mut chars = local[1..local.len() - 1].chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some(next) if next == ' ' || next.is_ascii_graphic() => {}
                _ => return Err("invalid quoted-pair in local-part"),
            },
            '"' => return Err("unescaped quote in local-part"),
            ' ' => {}
            c if c.is_ascii_graphic() => {}
            _ => return Err("invalid character in quoted local-part"),
        }
    }
    Ok(())
}

fn validate_domain(domain: &str) -> std::result::Result<(), &'static str> {
    for label in domain.split('.') {
        if label.is_empty() {
            return Err("empty domain label");
        }
        if label.len() > MAX_LABEL_LENGTH {
            return Err("domain label too long");
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err("invalid character in domain");
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err("domain label cannot start or end with '-'");
        }
    }
    Ok(())
}

fn validate_address_literal(domain: &str) -> std::result::Result<(), &'static str> {
    let inner = domain
        .strip_prefix('[')
        .and_then(|d| d.strip_suffix(']'))
        .ok_or("unclosed address literal")?;

    let valid = inner.strip_prefix("IPv6:").map_or_else(
        || inner.parse::<Ipv4Addr>().is_ok(),
        |v6| v6.parse::<Ipv6Addr>().is_ok(),
    );

    if valid {
        Ok(())
    } else {
        Err("invalid address literal")
    }
}

const fn is_atext(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '!' | '#'
                | '$'
                | '%'
                | '&'
                | '\''
                | '*'
                | '+'
                | '-'
                | '/'
                | '='
                | '?'
                | '^'
                | '_'
                | '`'
                | '{'
                | '|'
                | '}'
                | '~'
        )
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::similar_names
)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_valid_address() {
        let mailbox = Mailbox::new("user@example.com").unwrap();
        assert_eq!(mailbox.email(), "user@example.com");
        assert_eq!(mailbox.local_part(), "user");
        assert_eq!(mailbox.domain(), "example.com");
        assert!(mailbox.name().is_none());
        assert!(mailbox.charset().is_none());
    }

    #[test]
    fn test_name_and_charset_attached_verbatim() {
        let mailbox =
            parse_address(Some("replyto@example.com"), Some("67"), Some("UTF-8")).unwrap();
        assert_eq!(mailbox.name(), Some("67"));
        assert_eq!(mailbox.charset(), Some("UTF-8"));
    }

    #[test]
    fn test_null_is_fault_not_validation() {
        let err = parse_address(None, Some("Name"), None).unwrap_err();
        assert_eq!(err, Error::NullArgument("email"));
        assert!(err.is_fault());
    }

    #[test]
    fn test_invalid_addresses() {
        for raw in [
            "",
            "invalid-email",
            "@example.com",
            "user@",
            "user@@example.com",
            "user@exa mple.com",
            ".user@example.com",
            "user.@example.com",
            "us..er@example.com",
            "user@-example.com",
            "user@example..com",
            "user name@example.com",
            "\"unclosed@example.com",
            "user@[300.1.1.1]",
        ] {
            let err = parse_address(Some(raw), None, None).unwrap_err();
            assert!(
                matches!(err, Error::InvalidAddress(_)),
                "expected {raw:?} to be rejected"
            );
            assert!(!err.is_fault());
        }
    }

    #[test]
    fn test_quoted_local_part() {
        assert!(is_valid_address("\"john doe\"@example.com"));
        assert!(is_valid_address("\"a@b\"@example.com"));
        assert!(!is_valid_address("\"a\"b\"@example.com"));
    }

    #[test]
    fn test_address_literals() {
        assert!(is_valid_address("postmaster@[192.168.0.1]"));
        assert!(is_valid_address("postmaster@[IPv6:::1]"));
        assert!(!is_valid_address("postmaster@[not-an-ip]"));
    }

    #[test]
    fn test_length_limits() {
        let local = "a".repeat(65);
        assert!(!is_valid_address(&format!("{local}@example.com")));
        let label = "b".repeat(64);
        assert!(!is_valid_address(&format!("user@{label}.com")));
    }

    #[test]
    fn test_display() {
        let plain = Mailbox::new("user@example.com").unwrap();
        assert_eq!(plain.to_string(), "user@example.com");

        let named = Mailbox::with_name("john@example.com", "John \"JD\" Doe").unwrap();
        assert_eq!(named.to_string(), "\"John \\\"JD\\\" Doe\" <john@example.com>");
    }

    fn address_strategy() -> impl Strategy<Value = String> {
        let atoms = prop::collection::vec("[a-z0-9+_-]{1,10}", 1..=3);
        let labels = prop::collection::vec("[a-z0-9]{1,10}", 1..=3);
        (atoms, labels).prop_map(|(atoms, labels)| format!("{}@{}", atoms.join("."), labels.join(".")))
    }

    proptest! {
        #[test]
        fn prop_valid_addresses_keep_raw_text(raw in address_strategy()) {
            let mailbox = parse_address(Some(&raw), None, None).unwrap();
            prop_assert_eq!(mailbox.email(), raw.as_str());
        }

        #[test]
        fn prop_addresses_without_at_are_rejected(raw in "[a-z0-9.]{0,30}") {
            let result = parse_address(Some(&raw), None, None);
            prop_assert!(matches!(result, Err(Error::InvalidAddress(_))));
        }
    }
}
