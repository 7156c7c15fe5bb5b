//! One-shot message composer.

use crate::error::{Error, Result};
use crate::recipients::{RecipientKind, RecipientList};
use chrono::{DateTime, Utc};
use mailcompose_mime::{Body, ContentType, Headers, Mailbox, Message, encoding, parse_address};
use mailcompose_smtp::{Session, TransportConfig};
use std::sync::Arc;

/// Observable lifecycle state of a [`Composer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildState {
    /// Fields can still be changed.
    Open,
    /// The message has been assembled; the composer is frozen.
    Built,
}

#[derive(Debug, Clone)]
enum State {
    Open,
    Built(Arc<Message>),
}

/// Accumulates message fields and assembles them exactly once.
///
/// Addresses and headers are validated as they are added; completeness
/// (a sender and at least one recipient) is checked by [`Composer::build`].
/// A failed build leaves the composer open so the missing field can be
/// supplied. Once built, message fields can no longer be changed, while
/// transport settings stay adjustable so a session can still be made.
///
/// ```ignore
/// let mut composer = Composer::new();
/// composer.set_host_name("smtp.example.com");
/// composer.set_from("sender@example.com")?;
/// composer.add_to("recipient@example.com")?;
/// composer.set_subject("Hello")?;
/// composer.set_content("Hi there.", "text/plain")?;
///
/// let message = composer.build()?;
/// let session = composer.mail_session()?;
/// ```
#[derive(Debug, Clone)]
pub struct Composer {
    transport: TransportConfig,
    session: Option<Session>,
    from: Option<Mailbox>,
    subject: Option<String>,
    content: Option<Body>,
    charset: Option<String>,
    sent_date: Option<DateTime<Utc>>,
    headers: Headers,
    to: RecipientList,
    cc: RecipientList,
    bcc: RecipientList,
    reply_to: RecipientList,
    state: State,
}

impl Default for Composer {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            session: None,
            from: None,
            subject: None,
            content: None,
            charset: None,
            sent_date: None,
            headers: Headers::new(),
            to: RecipientList::new(RecipientKind::To),
            cc: RecipientList::new(RecipientKind::Cc),
            bcc: RecipientList::new(RecipientKind::Bcc),
            reply_to: RecipientList::new(RecipientKind::ReplyTo),
            state: State::Open,
        }
    }
}

impl Composer {
    /// Creates an empty composer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty composer with the given transport settings.
    #[must_use]
    pub fn with_transport(transport: TransportConfig) -> Self {
        Self {
            transport,
            ..Self::default()
        }
    }

    // Transport settings

    /// Sets the SMTP host name.
    pub fn set_host_name(&mut self, host_name: impl Into<String>) {
        self.transport.set_host_name(host_name);
        self.session = None;
    }

    /// SMTP host name, or `None` if it was never set.
    #[must_use]
    pub fn host_name(&self) -> Option<&str> {
        self.transport.host_name()
    }

    /// Sets the socket connection timeout in milliseconds.
    pub fn set_socket_connection_timeout(&mut self, millis: u64) {
        self.transport.set_socket_connection_timeout(millis);
        self.session = None;
    }

    /// Socket connection timeout in milliseconds.
    #[must_use]
    pub const fn socket_connection_timeout(&self) -> u64 {
        self.transport.socket_connection_timeout()
    }

    /// Transport settings.
    #[must_use]
    pub const fn transport(&self) -> &TransportConfig {
        &self.transport
    }

    /// Mutable transport settings. Drops any cached session.
    pub fn transport_mut(&mut self) -> &mut TransportConfig {
        self.session = None;
        &mut self.transport
    }

    /// Returns the session for the current transport settings.
    ///
    /// The session is created on first use and reused until a transport
    /// setting changes.
    ///
    /// # Errors
    ///
    /// Returns a transport error if no host name is set or it is malformed.
    pub fn mail_session(&mut self) -> Result<&Session> {
        let session = match self.session.take() {
            Some(session) => session,
            None => self.transport.build_session()?,
        };
        Ok(self.session.insert(session))
    }

    // Single-valued message fields

    /// Sets the sender.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed or the message is built.
    pub fn set_from(&mut self, email: &str) -> Result<()> {
        let charset = self.charset.clone();
        self.set_from_with_charset(email, None, charset.as_deref())
    }

    /// Sets the sender with a display name.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed or the message is built.
    pub fn set_from_named(&mut self, email: &str, name: &str) -> Result<()> {
        let charset = self.charset.clone();
        self.set_from_with_charset(email, Some(name), charset.as_deref())
    }

    /// Sets the sender with a display name encoded in `charset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed or the message is built.
    pub fn set_from_with_charset(
        &mut self,
        email: &str,
        name: Option<&str>,
        charset: Option<&str>,
    ) -> Result<()> {
        self.ensure_open()?;
        let mailbox = parse_address(Some(email), name, charset)?;
        tracing::debug!(address = mailbox.email(), "set sender");
        self.from = Some(mailbox);
        Ok(())
    }

    /// Sets the subject.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyBuilt`] if the message is built.
    pub fn set_subject(&mut self, subject: impl Into<String>) -> Result<()> {
        self.ensure_open()?;
        self.subject = Some(subject.into());
        Ok(())
    }

    /// Sets the body and its content type, e.g. `"text/html"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the content type is malformed or the message is built.
    pub fn set_content(&mut self, text: impl Into<String>, content_type: &str) -> Result<()> {
        self.ensure_open()?;
        let content_type = ContentType::parse(content_type)?;
        self.content = Some(Body::new(text, content_type));
        Ok(())
    }

    /// Sets the charset used for the body and for encoding headers.
    ///
    /// The label must name a known charset (`utf-8`, `iso-8859-1`, ...).
    ///
    /// # Errors
    ///
    /// Returns an error if the label is unknown or the message is built.
    pub fn set_charset(&mut self, charset: &str) -> Result<()> {
        self.ensure_open()?;
        let charset = charset.trim();
        encoding::lookup_charset(charset)?;
        self.charset = Some(charset.to_string());
        Ok(())
    }

    /// Sets the sent date. When unset, the time of [`Composer::build`] is used.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyBuilt`] if the message is built.
    pub fn set_sent_date(&mut self, sent_date: DateTime<Utc>) -> Result<()> {
        self.ensure_open()?;
        self.sent_date = Some(sent_date);
        Ok(())
    }

    /// Adds a custom header, replacing any header with the same name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or value is empty or malformed, the name
    /// is one the message renders itself (`From`, `Subject`, ...), or the
    /// message is built.
    pub fn add_header(&mut self, name: &str, value: &str) -> Result<()> {
        self.ensure_open()?;
        self.headers.add(name, value)?;
        Ok(())
    }

    // Recipients

    /// Adds a To recipient.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed or the message is built.
    pub fn add_to(&mut self, email: &str) -> Result<()> {
        self.add_recipient(RecipientKind::To, email, None)
    }

    /// Adds a To recipient with a display name.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed or the message is built.
    pub fn add_to_named(&mut self, email: &str, name: &str) -> Result<()> {
        self.add_recipient(RecipientKind::To, email, Some(name))
    }

    /// Adds several To recipients, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoAddresses`] if `emails` is empty, or an error for
    /// the first malformed address.
    pub fn add_tos<S: AsRef<str>>(&mut self, emails: &[S]) -> Result<()> {
        self.add_recipients(RecipientKind::To, emails)
    }

    /// Adds a Cc recipient.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed or the message is built.
    pub fn add_cc(&mut self, email: &str) -> Result<()> {
        self.add_recipient(RecipientKind::Cc, email, None)
    }

    /// Adds a Cc recipient with a display name.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed or the message is built.
    pub fn add_cc_named(&mut self, email: &str, name: &str) -> Result<()> {
        self.add_recipient(RecipientKind::Cc, email, Some(name))
    }

    /// Adds several Cc recipients, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoAddresses`] if `emails` is empty, or an error for
    /// the first malformed address.
    pub fn add_ccs<S: AsRef<str>>(&mut self, emails: &[S]) -> Result<()> {
        self.add_recipients(RecipientKind::Cc, emails)
    }

    /// Adds a Bcc recipient.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed or the message is built.
    pub fn add_bcc(&mut self, email: &str) -> Result<()> {
        self.add_recipient(RecipientKind::Bcc, email, None)
    }

    /// Adds a Bcc recipient with a display name.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed or the message is built.
    pub fn add_bcc_named(&mut self, email: &str, name: &str) -> Result<()> {
        self.add_recipient(RecipientKind::Bcc, email, Some(name))
    }

    /// Adds several Bcc recipients, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoAddresses`] if `emails` is empty, or an error for
    /// the first malformed address.
    pub fn add_bccs<S: AsRef<str>>(&mut self, emails: &[S]) -> Result<()> {
        self.add_recipients(RecipientKind::Bcc, emails)
    }

    /// Adds a Reply-To address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed or the message is built.
    pub fn add_reply_to(&mut self, email: &str) -> Result<()> {
        self.add_recipient(RecipientKind::ReplyTo, email, None)
    }

    /// Adds a Reply-To address with a display name.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed or the message is built.
    pub fn add_reply_to_named(&mut self, email: &str, name: &str) -> Result<()> {
        self.add_recipient(RecipientKind::ReplyTo, email, Some(name))
    }

    /// Adds several Reply-To addresses, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoAddresses`] if `emails` is empty, or an error for
    /// the first malformed address.
    pub fn add_reply_tos<S: AsRef<str>>(&mut self, emails: &[S]) -> Result<()> {
        self.add_recipients(RecipientKind::ReplyTo, emails)
    }

    /// Adds one address to any list, using the composer's charset for the name.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed or the message is built.
    pub fn add_recipient(&mut self, kind: RecipientKind, email: &str, name: Option<&str>) -> Result<()> {
        let charset = self.charset.clone();
        self.add_recipient_with_charset(kind, email, name, charset.as_deref())
    }

    /// Adds one address to any list with an explicit charset for the name.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is malformed or the message is built.
    pub fn add_recipient_with_charset(
        &mut self,
        kind: RecipientKind,
        email: &str,
        name: Option<&str>,
        charset: Option<&str>,
    ) -> Result<()> {
        self.ensure_open()?;
        self.list_mut(kind).add_one(Some(email), name, charset)
    }

    /// Adds several addresses to any list, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoAddresses`] if `emails` is empty, or an error for
    /// the first malformed address.
    pub fn add_recipients<S: AsRef<str>>(&mut self, kind: RecipientKind, emails: &[S]) -> Result<()> {
        self.ensure_open()?;
        self.list_mut(kind).add_many(Some(emails))
    }

    // Accessors

    /// Sender, if set.
    #[must_use]
    pub const fn from_address(&self) -> Option<&Mailbox> {
        self.from.as_ref()
    }

    /// Subject, if set.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Charset, if set.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    /// The configured sent date, or the one stamped by a successful build.
    #[must_use]
    pub fn sent_date(&self) -> Option<DateTime<Utc>> {
        match &self.state {
            State::Built(message) => Some(message.sent_date()),
            State::Open => self.sent_date,
        }
    }

    /// Custom headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Addresses of one list.
    #[must_use]
    pub fn addresses(&self, kind: RecipientKind) -> &[Mailbox] {
        match kind {
            RecipientKind::To => self.to.list(),
            RecipientKind::Cc => self.cc.list(),
            RecipientKind::Bcc => self.bcc.list(),
            RecipientKind::ReplyTo => self.reply_to.list(),
        }
    }

    /// To recipients.
    #[must_use]
    pub fn to_addresses(&self) -> &[Mailbox] {
        self.to.list()
    }

    /// Cc recipients.
    #[must_use]
    pub fn cc_addresses(&self) -> &[Mailbox] {
        self.cc.list()
    }

    /// Bcc recipients.
    #[must_use]
    pub fn bcc_addresses(&self) -> &[Mailbox] {
        self.bcc.list()
    }

    /// Reply-To addresses.
    #[must_use]
    pub fn reply_to_addresses(&self) -> &[Mailbox] {
        self.reply_to.list()
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> BuildState {
        match self.state {
            State::Open => BuildState::Open,
            State::Built(_) => BuildState::Built,
        }
    }

    /// Returns true once [`Composer::build`] has succeeded.
    #[must_use]
    pub const fn is_built(&self) -> bool {
        matches!(self.state, State::Built(_))
    }

    /// The assembled message, once built.
    #[must_use]
    pub const fn message(&self) -> Option<&Arc<Message>> {
        match &self.state {
            State::Built(message) => Some(message),
            State::Open => None,
        }
    }

    // Build

    /// Validates the composition and assembles the message.
    ///
    /// On success the composer moves to [`BuildState::Built`] and keeps the
    /// returned message available through [`Composer::message`]. On a
    /// missing sender or recipient it stays [`BuildState::Open`].
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyBuilt`] if called after a successful build.
    /// - [`Error::MissingSender`] if no From address is set.
    /// - [`Error::MissingRecipient`] if To, Cc, and Bcc are all empty.
    pub fn build(&mut self) -> Result<Arc<Message>> {
        self.ensure_open().inspect_err(|_| {
            tracing::warn!("build called on an already built message");
        })?;
        let from = self.check_complete().inspect_err(|e| {
            tracing::warn!(error = %e, "message is incomplete");
        })?;

        let message = Arc::new(self.assemble(from));
        tracing::info!(
            to = self.to.len(),
            cc = self.cc.len(),
            bcc = self.bcc.len(),
            headers = self.headers.len(),
            "built message"
        );

        self.state = State::Built(Arc::clone(&message));
        Ok(message)
    }

    /// Returns the sender once the composition has everything `build` needs.
    fn check_complete(&self) -> Result<Mailbox> {
        let from = self.from.clone().ok_or(Error::MissingSender)?;
        if self.to.is_empty() && self.cc.is_empty() && self.bcc.is_empty() {
            return Err(Error::MissingRecipient);
        }
        Ok(from)
    }

    fn assemble(&self, from: Mailbox) -> Message {
        let body = match (&self.content, &self.charset) {
            (Some(body), _) => Some(body.clone()),
            (None, Some(charset)) => Some(Body::new(
                String::new(),
                ContentType::text_plain().with_charset(charset),
            )),
            (None, None) => None,
        };

        let mut message = Message::new(from, self.sent_date.unwrap_or_else(Utc::now))
            .with_reply_to(self.reply_to.list().to_vec())
            .with_headers(self.headers.clone())
            .with_subject(self.subject.clone())
            .with_body(body)
            .with_charset(self.charset.clone());

        for list in [&self.to, &self.cc, &self.bcc] {
            if let Some(kind) = list.kind().recipient_type() {
                message = message.with_recipients(kind, list.list().to_vec());
            }
        }
        message
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            State::Open => Ok(()),
            State::Built(_) => Err(Error::AlreadyBuilt),
        }
    }

    const fn list_mut(&mut self, kind: RecipientKind) -> &mut RecipientList {
        match kind {
            RecipientKind::To => &mut self.to,
            RecipientKind::Cc => &mut self.cc,
            RecipientKind::Bcc => &mut self.bcc,
            RecipientKind::ReplyTo => &mut self.reply_to,
        }
    }
}
