//! # mailcompose-mime
//!
//! Message-format building blocks for composing email.
//!
//! ## Features
//!
//! - **Address validation**: RFC 5321 mailbox grammar, optional display name and charset
//! - **Headers**: Ordered, case-sensitive custom header collection
//! - **Content types**: `type/subtype; param=value` parsing and formatting
//! - **Messages**: Assembled single-part messages and RFC 5322 rendering
//! - **Encoding**: Base64 and RFC 2047 header encoding in any WHATWG charset
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailcompose_mime::{Message, Mailbox, RecipientType, parse_address};
//!
//! let from = parse_address(Some("sender@example.com"), Some("Sender"), None)?;
//! let to = Mailbox::new("recipient@example.com")?;
//!
//! let message = Message::new(from, chrono::Utc::now())
//!     .with_recipients(RecipientType::To, vec![to])
//!     .with_subject(Some("Hello".into()));
//!
//! let raw = message.to_rfc5322()?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod address;
mod content_type;
mod error;
mod header;
mod message;

pub mod encoding;

pub use address::{Mailbox, is_valid_address, parse_address};
pub use content_type::ContentType;
pub use error::{Error, Result};
pub use header::Headers;
pub use message::{Body, DEFAULT_CHARSET, Message, RecipientType};
