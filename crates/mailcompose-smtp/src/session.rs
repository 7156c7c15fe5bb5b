//! Session handles.

use crate::config::Security;
use std::time::Duration;

/// Connection context for one SMTP server.
///
/// A session is a validated snapshot of the transport settings, handed
/// as is to whatever delivers the message. It never touches the network
/// itself; the timeouts are carried for the deliverer to enforce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    host: String,
    port: u16,
    security: Security,
    connect_timeout: Duration,
    io_timeout: Duration,
    debug: bool,
}

impl Session {
    pub(crate) const fn new(
        host: String,
        port: u16,
        security: Security,
        connect_timeout: Duration,
        io_timeout: Duration,
        debug: bool,
    ) -> Self {
        Self {
            host,
            port,
            security,
            connect_timeout,
            io_timeout,
            debug,
        }
    }

    /// Server host name.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Server port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Security mode.
    #[must_use]
    pub const fn security(&self) -> Security {
        self.security
    }

    /// Maximum time allowed to establish the connection.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Maximum time allowed for each read.
    #[must_use]
    pub const fn io_timeout(&self) -> Duration {
        self.io_timeout
    }

    /// Whether protocol tracing is enabled.
    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }
}
