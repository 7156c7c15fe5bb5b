//! Assembled message structure and rendering.

use crate::address::Mailbox;
use crate::content_type::ContentType;
use crate::encoding::{encode_base64_lines, encode_rfc2047, encode_text, needs_encoding};
use crate::error::Result;
use crate::header::Headers;
use chrono::{DateTime, Utc};
use std::fmt;
use std::fmt::Write as _;

/// Charset used for rendering when none was configured.
pub const DEFAULT_CHARSET: &str = "utf-8";

/// Recipient categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RecipientType {
    /// Primary recipients.
    To,
    /// Carbon copy.
    Cc,
    /// Blind carbon copy. Never rendered into the message text.
    Bcc,
}

impl RecipientType {
    /// Header name for this category.
    #[must_use]
    pub const fn header_name(self) -> &'static str {
        match self {
            Self::To => "To",
            Self::Cc => "Cc",
            Self::Bcc => "Bcc",
        }
    }
}

impl fmt::Display for RecipientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header_name())
    }
}

/// Single-part message content.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Body {
    /// Body text.
    pub text: String,
    /// Content type of the body.
    pub content_type: ContentType,
}

impl Body {
    /// Creates a new body.
    #[must_use]
    pub fn new(text: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            text: text.into(),
            content_type,
        }
    }
}

/// An assembled, read-only email message.
///
/// Empty recipient categories are never stored, so every category
/// accessor returns either `None` or a non-empty slice.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    from: Mailbox,
    to: Vec<Mailbox>,
    cc: Vec<Mailbox>,
    bcc: Vec<Mailbox>,
    reply_to: Vec<Mailbox>,
    headers: Headers,
    subject: Option<String>,
    body: Option<Body>,
    charset: Option<String>,
    sent_date: DateTime<Utc>,
}

impl Message {
    /// Creates a message with a sender and a sent date and nothing else.
    #[must_use]
    pub fn new(from: Mailbox, sent_date: DateTime<Utc>) -> Self {
        Self {
            from,
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            reply_to: Vec::new(),
            headers: Headers::new(),
            subject: None,
            body: None,
            charset: None,
            sent_date,
        }
    }

    /// Sets the recipients of one category.
    #[must_use]
    pub fn with_recipients(mut self, kind: RecipientType, recipients: Vec<Mailbox>) -> Self {
        match kind {
            RecipientType::To => self.to = recipients,
            RecipientType::Cc => self.cc = recipients,
            RecipientType::Bcc => self.bcc = recipients,
        }
        self
    }

    /// Sets the Reply-To addresses.
    #[must_use]
    pub fn with_reply_to(mut self, reply_to: Vec<Mailbox>) -> Self {
        self.reply_to = reply_to;
        self
    }

    /// Sets the custom headers.
    #[must_use]
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the subject.
    #[must_use]
    pub fn with_subject(mut self, subject: Option<String>) -> Self {
        self.subject = subject;
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: Option<Body>) -> Self {
        self.body = body;
        self
    }

    /// Sets the charset used for headers and body text.
    #[must_use]
    pub fn with_charset(mut self, charset: Option<String>) -> Self {
        self.charset = charset;
        self
    }

    /// Sender.
    #[must_use]
    pub const fn from(&self) -> &Mailbox {
        &self.from
    }

    /// Recipients of one category, or `None` if the category was omitted.
    #[must_use]
    pub fn recipients(&self, kind: RecipientType) -> Option<&[Mailbox]> {
        let list = match kind {
            RecipientType::To => &self.to,
            RecipientType::Cc => &self.cc,
            RecipientType::Bcc => &self.bcc,
        };
        non_empty(list)
    }

    /// Every recipient across To, Cc, and Bcc, in that order.
    pub fn all_recipients(&self) -> impl Iterator<Item = &Mailbox> {
        self.to.iter().chain(&self.cc).chain(&self.bcc)
    }

    /// Reply-To addresses, or `None` if no Reply-To was set.
    #[must_use]
    pub fn reply_to(&self) -> Option<&[Mailbox]> {
        non_empty(&self.reply_to)
    }

    /// Custom headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Gets a custom header value.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Subject.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Body, if the message carries content.
    #[must_use]
    pub const fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// Content type of the body.
    #[must_use]
    pub fn content_type(&self) -> Option<&ContentType> {
        self.body.as_ref().map(|b| &b.content_type)
    }

    /// Charset configured for the message.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    /// Sent date.
    #[must_use]
    pub const fn sent_date(&self) -> DateTime<Utc> {
        self.sent_date
    }

    /// Renders the message as RFC 5322 text.
    ///
    /// Bcc recipients are left out. Non-ASCII display names, subjects and
    /// custom header values are RFC 2047 encoded; non-ASCII bodies are sent
    /// as Base64 in the body's charset, which a text content type then names.
    ///
    /// # Errors
    ///
    /// Returns an error if a charset is unknown or cannot represent the text,
    /// or the body's content type is not well-formed.
    pub fn to_rfc5322(&self) -> Result<Vec<u8>> {
        let charset = self.charset.as_deref().unwrap_or(DEFAULT_CHARSET);
        let mut out = String::new();

        let _ = write!(out, "Date: {}\r\n", self.sent_date.to_rfc2822());
        let _ = write!(out, "From: {}\r\n", render_mailbox(&self.from, charset)?);
        for kind in [RecipientType::To, RecipientType::Cc] {
            if let Some(list) = self.recipients(kind) {
                let _ = write!(out, "{kind}: {}\r\n", render_list(list, charset)?);
            }
        }
        if let Some(list) = self.reply_to() {
            let _ = write!(out, "Reply-To: {}\r\n", render_list(list, charset)?);
        }
        if let Some(subject) = &self.subject {
            let _ = write!(out, "Subject: {}\r\n", encode_rfc2047(subject, charset)?);
        }
        out.push_str(&self.headers.encode(charset)?);
        out.push_str("MIME-Version: 1.0\r\n");

        let Some(body) = &self.body else {
            out.push_str("\r\n");
            return Ok(out.into_bytes());
        };

        body.content_type.validate()?;
        let text = normalize_line_endings(&body.text);
        if text.is_ascii() {
            let _ = write!(out, "Content-Type: {}\r\n", body.content_type);
            out.push_str("Content-Transfer-Encoding: 7bit\r\n\r\n");
            out.push_str(&text);
        } else {
            let body_charset = body.content_type.charset().unwrap_or(charset);
            let (used, bytes) = encode_text(&text, body_charset)?;

            // 8-bit text has to name the charset its bytes are in.
            let mut content_type = body.content_type.clone();
            if content_type.is_text() && content_type.charset().is_none() {
                content_type = content_type.with_charset(used);
            }
            let _ = write!(out, "Content-Type: {content_type}\r\n");
            out.push_str("Content-Transfer-Encoding: base64\r\n\r\n");
            out.push_str(&encode_base64_lines(&bytes));
        }

        Ok(out.into_bytes())
    }
}

fn non_empty(list: &[Mailbox]) -> Option<&[Mailbox]> {
    if list.is_empty() { None } else { Some(list) }
}

fn render_mailbox(mailbox: &Mailbox, default_charset: &str) -> Result<String> {
    match mailbox.name() {
        Some(name) if needs_encoding(name) => {
            let charset = mailbox.charset().unwrap_or(default_charset);
            Ok(format!("{} <{}>", encode_rfc2047(name, charset)?, mailbox.email()))
        }
        _ => Ok(mailbox.to_string()),
    }
}

fn render_list(list: &[Mailbox], charset: &str) -> Result<String> {
    let rendered = list
        .iter()
        .map(|m| render_mailbox(m, charset))
        .collect::<Result<Vec<_>>>()?;
    Ok(rendered.join(", "))
}

fn normalize_line_endings(text: &str) -> String {
    let mut out = text.replace("\r\n", "\n").replace('\n', "\r\n");
    if !out.ends_with("\r\n") {
        out.push_str("\r\n");
    }
    out
}
