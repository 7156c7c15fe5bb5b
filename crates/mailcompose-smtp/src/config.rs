//! Transport configuration.

use crate::error::{Error, Result};
use crate::session::Session;
use std::time::Duration;

/// Default socket connection and I/O timeout in milliseconds.
pub const DEFAULT_SOCKET_TIMEOUT_MS: u64 = 60_000;

/// Connection security mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Security {
    /// Plain TCP (port 25).
    #[default]
    None,
    /// Plain TCP, upgraded with STARTTLS by the deliverer (port 587).
    StartTls,
    /// TLS from the start (port 465).
    Tls,
}

impl Security {
    /// Returns the default port for this security mode.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::None => 25,
            Self::StartTls => 587,
            Self::Tls => 465,
        }
    }
}

/// SMTP transport settings.
///
/// Every field may be left unset; only [`TransportConfig::build_session`]
/// insists on a host name.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TransportConfig {
    host_name: Option<String>,
    port: Option<u16>,
    security: Security,
    socket_connection_timeout: u64,
    socket_timeout: u64,
    debug: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            host_name: None,
            port: None,
            security: Security::None,
            socket_connection_timeout: DEFAULT_SOCKET_TIMEOUT_MS,
            socket_timeout: DEFAULT_SOCKET_TIMEOUT_MS,
            debug: false,
        }
    }
}

impl TransportConfig {
    /// Creates a configuration with no host and default timeouts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration builder.
    #[must_use]
    pub fn builder(host: impl Into<String>) -> TransportConfigBuilder {
        TransportConfigBuilder::new(host)
    }

    /// Sets the SMTP host name.
    pub fn set_host_name(&mut self, host_name: impl Into<String>) {
        self.host_name = Some(host_name.into());
    }

    /// SMTP host name, or `None` if it was never set.
    #[must_use]
    pub fn host_name(&self) -> Option<&str> {
        self.host_name.as_deref()
    }

    /// Sets an explicit port.
    pub const fn set_port(&mut self, port: u16) {
        self.port = Some(port);
    }

    /// Port to connect to; the security mode's default unless set explicitly.
    #[must_use]
    pub const fn port(&self) -> u16 {
        match self.port {
            Some(port) => port,
            None => self.security.default_port(),
        }
    }

    /// Sets the security mode.
    pub const fn set_security(&mut self, security: Security) {
        self.security = security;
    }

    /// Security mode.
    #[must_use]
    pub const fn security(&self) -> Security {
        self.security
    }

    /// Sets the socket connection timeout in milliseconds.
    pub const fn set_socket_connection_timeout(&mut self, millis: u64) {
        self.socket_connection_timeout = millis;
    }

    /// Socket connection timeout in milliseconds.
    #[must_use]
    pub const fn socket_connection_timeout(&self) -> u64 {
        self.socket_connection_timeout
    }

    /// Sets the socket read timeout in milliseconds.
    pub const fn set_socket_timeout(&mut self, millis: u64) {
        self.socket_timeout = millis;
    }

    /// Socket read timeout in milliseconds.
    #[must_use]
    pub const fn socket_timeout(&self) -> u64 {
        self.socket_timeout
    }

    /// Enables protocol tracing on sessions built from this config.
    pub const fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Whether protocol tracing is enabled.
    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }

    /// Builds a session handle from this configuration.
    ///
    /// No connection is made here.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingHost`] if no non-empty host name is set.
    /// - [`Error::InvalidHostName`] if the host name contains whitespace or
    ///   control characters.
    pub fn build_session(&self) -> Result<Session> {
        let host = self
            .host_name
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(Error::MissingHost)?;
        if host.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(Error::InvalidHostName(host.to_string()));
        }

        tracing::debug!(
            host,
            port = self.port(),
            security = ?self.security,
            connect_timeout_ms = self.socket_connection_timeout,
            "built SMTP session"
        );

        Ok(Session::new(
            host.to_string(),
            self.port(),
            self.security,
            Duration::from_millis(self.socket_connection_timeout),
            Duration::from_millis(self.socket_timeout),
            self.debug,
        ))
    }
}

/// Builder for transport configuration.
#[derive(Debug, Clone)]
pub struct TransportConfigBuilder {
    config: TransportConfig,
}

impl TransportConfigBuilder {
    /// Creates a new builder with the given hostname.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        let mut config = TransportConfig::new();
        config.set_host_name(host);
        Self { config }
    }

    /// Sets the port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.config.port = Some(port);
        self
    }

    /// Sets the security mode.
    #[must_use]
    pub const fn security(mut self, security: Security) -> Self {
        self.config.security = security;
        self
    }

    /// Sets the socket connection timeout in milliseconds.
    #[must_use]
    pub const fn socket_connection_timeout(mut self, millis: u64) -> Self {
        self.config.socket_connection_timeout = millis;
        self
    }

    /// Sets the socket read timeout in milliseconds.
    #[must_use]
    pub const fn socket_timeout(mut self, millis: u64) -> Self {
        self.config.socket_timeout = millis;
        self
    }

    /// Enables protocol tracing.
    #[must_use]
    pub const fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> TransportConfig {
        self.config
    }
}
