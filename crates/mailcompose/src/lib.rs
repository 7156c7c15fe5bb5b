//! # mailcompose
//!
//! One-shot email message composer.
//!
//! A [`Composer`] accumulates sender, recipients, headers, content, and
//! transport settings in any order, then assembles a single read-only
//! [`Message`] with [`Composer::build`]. Validation happens in two layers:
//!
//! - **At add time**: addresses, header names and values, and content types
//!   are checked by the call that supplies them.
//! - **At build time**: the composition must have a sender and at least one
//!   To, Cc, or Bcc recipient.
//!
//! ## Lifecycle
//!
//! ```text
//! ┌──────────┐   build() ok    ┌──────────┐
//! │   Open   │ ──────────────→ │  Built   │ ── build() ──→ AlreadyBuilt
//! └──────────┘                 └──────────┘
//!    │    ↑
//!    └────┘ build() missing sender / recipient
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailcompose::Composer;
//!
//! let mut composer = Composer::new();
//! composer.set_host_name("smtp.example.com");
//! composer.set_from("sender@example.com")?;
//! composer.add_to("recipient@example.com")?;
//! composer.add_reply_to_named("replyto@example.com", "Support")?;
//! composer.add_header("X-Custom-Header", "CustomValue")?;
//! composer.set_subject("Test Subject")?;
//! composer.set_content("This is a test email.", "text/plain")?;
//!
//! let message = composer.build()?;
//! let raw = message.to_rfc5322()?;
//! let session = composer.mail_session()?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod composer;
mod error;
mod recipients;

pub use composer::{BuildState, Composer};
pub use error::{Error, ErrorKind, Result};
pub use recipients::{RecipientKind, RecipientList};

pub use mailcompose_mime::{
    Body, ContentType, Headers, Mailbox, Message, RecipientType, is_valid_address, parse_address,
};
pub use mailcompose_smtp::{Security, Session, TransportConfig, TransportConfigBuilder};

/// Message-format building blocks.
pub use mailcompose_mime as mime;
/// SMTP transport configuration and sessions.
pub use mailcompose_smtp as smtp;
