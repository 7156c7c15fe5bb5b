//! MIME content type handling.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use std::fmt;

/// MIME content type with parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentType {
    /// Main type (e.g., "text", "application").
    pub main_type: String,
    /// Subtype (e.g., "plain", "html").
    pub sub_type: String,
    /// Parameters in the order they were given (e.g., charset=utf-8).
    pub parameters: IndexMap<String, String>,
}

impl ContentType {
    /// Creates a new content type.
    #[must_use]
    pub fn new(main_type: impl Into<String>, sub_type: impl Into<String>) -> Self {
        Self {
            main_type: main_type.into(),
            sub_type: sub_type.into(),
            parameters: IndexMap::new(),
        }
    }

    /// Creates a bare text/plain content type.
    #[must_use]
    pub fn text_plain() -> Self {
        Self::new("text", "plain")
    }

    /// Creates a bare text/html content type.
    #[must_use]
    pub fn text_html() -> Self {
        Self::new("text", "html")
    }

    /// Adds a parameter.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Sets the charset parameter.
    #[must_use]
    pub fn with_charset(self, charset: impl Into<String>) -> Self {
        self.with_parameter("charset", charset)
    }

    /// Returns the charset parameter if present.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.parameters.get("charset").map(String::as_str)
    }

    /// Returns `type/subtype` without parameters.
    #[must_use]
    pub fn essence(&self) -> String {
        format!("{}/{}", self.main_type, self.sub_type)
    }

    /// Checks if this is a text content type.
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.main_type.eq_ignore_ascii_case("text")
    }

    /// Parses a content type string.
    ///
    /// Format: `type/subtype; param1=value1; param2="quoted value"`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidContentType`] if the type or subtype is missing
    /// or not a valid token, or a parameter is malformed or contains control
    /// characters.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidContentType(format!("{s:?}: {reason}"));

        let mut parts = split_parameters(s).into_iter();
        let type_str = parts.next().unwrap_or_default().trim();
        let (main_type, sub_type) = type_str
            .split_once('/')
            .ok_or_else(|| invalid("missing subtype"))?;

        let mut content_type =
            Self::new(main_type.trim().to_lowercase(), sub_type.trim().to_lowercase());

        for param in parts {
            let param = param.trim();
            if param.is_empty() {
                continue;
            }
            let (key, value) = param
                .split_once('=')
                .ok_or_else(|| invalid("parameter without value"))?;
            let value = unquote(value.trim()).ok_or_else(|| invalid("bad quoted value"))?;
            content_type
                .parameters
                .insert(key.trim().to_lowercase(), value);
        }

        content_type.validate().map_err(|_| invalid("invalid token or value"))?;
        Ok(content_type)
    }

    /// Checks that the type, subtype and parameter names are RFC 2045
    /// tokens and that no parameter value contains control characters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidContentType`] naming the first offending part.
    pub fn validate(&self) -> Result<()> {
        for part in [&self.main_type, &self.sub_type] {
            if !is_token(part) {
                return Err(Error::InvalidContentType(format!("invalid token {part:?}")));
            }
        }
        for (key, value) in &self.parameters {
            if !is_token(key) {
                return Err(Error::InvalidContentType(format!(
                    "invalid parameter name {key:?}"
                )));
            }
            if !value.chars().all(|c| c == ' ' || c.is_ascii_graphic()) {
                return Err(Error::InvalidContentType(format!(
                    "invalid value for parameter {key}"
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let main = &self.main_type;
        let sub = &self.sub_type;
        write!(f, "{main}/{sub}")?;

        for (key, value) in &self.parameters {
            if is_token(value) {
                write!(f, "; {key}={value}")?;
            } else {
                let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "; {key}=\"{escaped}\"")?;
            }
        }

        Ok(())
    }
}

const TSPECIALS: &str = "()<>@,;:\\\"/[]?=";

/// RFC 2045 token: printable ASCII without spaces or tspecials.
fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_graphic() && !TSPECIALS.contains(c))
}

/// Splits on `;` outside quoted strings.
fn split_parameters(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, ch) in s.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Strips the quotes from a quoted-string and resolves quoted-pairs.
/// Bare values are returned as is.
fn unquote(value: &str) -> Option<String> {
    let Some(inner) = value.strip_prefix('"') else {
        return Some(value.to_string());
    };
    let inner = inner.strip_suffix('"')?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => out.push(chars.next()?),
            '"' => return None,
            c => out.push(c),
        }
    }
    Some(out)
}
