//! Charset and transfer encoding utilities.
//!
//! Charset tables come from `encoding_rs`; labels follow the WHATWG
//! Encoding Standard (`utf-8`, `iso-8859-1`, `shift_jis`, ...).

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use encoding_rs::Encoding;

/// Maximum encoded line length for Base64 bodies (RFC 2045).
const MAX_LINE_LENGTH: usize = 76;

/// Maximum length of one RFC 2047 encoded-word.
const MAX_ENCODED_WORD_LENGTH: usize = 75;

/// Encodes data as Base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Encodes data as Base64 wrapped into CRLF-terminated lines.
#[must_use]
pub fn encode_base64_lines(data: &[u8]) -> String {
    let encoded = encode_base64(data);
    let mut result = String::with_capacity(encoded.len() + encoded.len() / MAX_LINE_LENGTH * 2 + 2);

    // Base64 output is pure ASCII, so byte chunks are valid str boundaries.
    for chunk in encoded.as_bytes().chunks(MAX_LINE_LENGTH) {
        result.push_str(&String::from_utf8_lossy(chunk));
        result.push_str("\r\n");
    }
    result
}

/// Looks up a charset by label.
///
/// # Errors
///
/// Returns [`Error::InvalidEncoding`] if the label is unknown.
pub fn lookup_charset(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| Error::InvalidEncoding(format!("Unknown charset: {label}")))
}

/// Encodes text into the bytes of the given charset.
///
/// Returns the canonical name of the charset actually used alongside the bytes.
///
/// # Errors
///
/// Returns [`Error::InvalidEncoding`] if the label is unknown or the text
/// contains characters the charset cannot represent.
pub fn encode_text(text: &str, charset: &str) -> Result<(&'static str, Vec<u8>)> {
    encode_with(lookup_charset(charset)?, text)
}

fn encode_with(encoding: &'static Encoding, text: &str) -> Result<(&'static str, Vec<u8>)> {
    let (bytes, used, had_errors) = encoding.encode(text);
    if had_errors {
        return Err(Error::InvalidEncoding(format!(
            "Text cannot be represented in {}",
            encoding.name()
        )));
    }
    Ok((used.name(), bytes.into_owned()))
}

/// Encodes a header value using RFC 2047 encoding.
///
/// Format: `=?charset?B?encoded-text?=`. Plain ASCII text is returned
/// unchanged. Text too long for one encoded-word is split on character
/// boundaries into several words joined by a folding `CRLF SP`.
///
/// # Errors
///
/// Returns an error if the charset is unknown or cannot represent the text.
pub fn encode_rfc2047(text: &str, charset: &str) -> Result<String> {
    if !needs_encoding(text) {
        return Ok(text.to_string());
    }

    let encoding = lookup_charset(charset)?;
    let (name, bytes) = encode_with(encoding, text)?;

    // "=?" name "?B?" payload "?=", payload in whole base64 quanta
    let payload = MAX_ENCODED_WORD_LENGTH.saturating_sub(name.len() + 7);
    let max_bytes = (payload / 4 * 3).max(4);
    if bytes.len() <= max_bytes {
        return Ok(encoded_word(name, &bytes));
    }

    let mut words = Vec::new();
    let mut chunk = String::new();
    let mut chunk_len = 0;
    let mut buf = [0u8; 4];
    for ch in text.chars() {
        let (_, char_bytes) = encode_with(encoding, ch.encode_utf8(&mut buf))?;
        if chunk_len + char_bytes.len() > max_bytes && !chunk.is_empty() {
            words.push(encoded_word(name, &encode_with(encoding, &chunk)?.1));
            chunk.clear();
            chunk_len = 0;
        }
        chunk.push(ch);
        chunk_len += char_bytes.len();
    }
    if !chunk.is_empty() {
        words.push(encoded_word(name, &encode_with(encoding, &chunk)?.1));
    }

    Ok(words.join("\r\n "))
}

fn encoded_word(charset_name: &str, bytes: &[u8]) -> String {
    format!("=?{charset_name}?B?{}?=", encode_base64(bytes))
}

/// Returns true if a header value has to be RFC 2047 encoded.
#[must_use]
pub fn needs_encoding(text: &str) -> bool {
    text.contains("=?") || !text.chars().all(|c| c.is_ascii() && !c.is_ascii_control())
}
