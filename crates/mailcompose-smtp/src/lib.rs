//! # mailcompose-smtp
//!
//! SMTP transport configuration and session handles.
//!
//! A [`TransportConfig`] collects host, port, security mode, and socket
//! timeouts. [`TransportConfig::build_session`] validates it into a
//! [`Session`], the handle passed to whatever actually delivers mail.
//! Nothing here opens a connection.
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailcompose_smtp::{Security, TransportConfig};
//!
//! let config = TransportConfig::builder("smtp.example.com")
//!     .security(Security::Tls)
//!     .socket_connection_timeout(10_000)
//!     .build();
//!
//! let session = config.build_session()?;
//! assert_eq!(session.port(), 465);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod session;

pub use config::{DEFAULT_SOCKET_TIMEOUT_MS, Security, TransportConfig, TransportConfigBuilder};
pub use error::{Error, Result};
pub use session::Session;
