//! # maildispatch-mime
//!
//! RFC 5322 / MIME message generation for outgoing HTML mail.
//!
//! ## Features
//!
//! - **Single-part or multipart**: a lone `text/html` part, or
//!   `multipart/mixed` with the HTML part first and attachments after it
//! - **Header encoding**: RFC 2047 for non-ASCII subjects, display names and
//!   filenames; long address lists are folded
//! - **Base64 bodies** wrapped at 76 columns
//! - **Content types** guessed from attachment filenames
//!
//! ## Quick Start
//!
//! ```ignore
//! use maildispatch_mime::{Attachment, Mailbox, MessageBuilder};
//!
//! let message = MessageBuilder::new()
//!     .from(Mailbox::new("noreply@example.com")?.with_name("Reports"))
//!     .to(Mailbox::new("recipient@example.com")?)
//!     .subject("Monthly report")
//!     .html_body("<p>Please find the report attached.</p>")
//!     .attach(Attachment::new("report.pdf", std::fs::read("report.pdf")?))
//!     .build()?;
//!
//! let bytes = message.to_bytes(); // ready for SMTP DATA
//! ```
//!
//! `Bcc` recipients never appear here: they belong to the SMTP envelope only.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod content_type;
mod error;
mod header;
mod mailbox;
mod message;

pub mod encoding;

pub use content_type::ContentType;
pub use error::{Error, Result};
pub use header::Headers;
pub use mailbox::Mailbox;
pub use message::{Attachment, Message, MessageBuilder};
