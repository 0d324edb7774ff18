//! # maildispatch-smtp
//!
//! An async SMTP submission client (RFC 5321) used by the feature-rich
//! delivery driver of `maildispatch`.
//!
//! ## Features
//!
//! - **Type-state connection management**: the compiler rejects `DATA`
//!   before `RCPT TO`, `RCPT TO` before `MAIL FROM`, and so on
//! - **Pluggable TLS policy**: every TLS handshake (implicit or STARTTLS)
//!   runs with a caller-supplied [`rustls::ClientConfig`], so the caller
//!   decides which server certificates are trusted
//! - **Authentication**: PLAIN and LOGIN, picked from the EHLO advertisement
//! - **Extensions**: STARTTLS, AUTH, SIZE, 8BITMIME, SMTPUTF8
//!
//! ## Quick Start
//!
//! ```ignore
//! use maildispatch_smtp::{Address, Client};
//! use maildispatch_smtp::connection::{connect, crypto_provider};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> maildispatch_smtp::Result<()> {
//!     let roots = rustls::RootCertStore {
//!         roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
//!     };
//!     let tls = rustls::ClientConfig::builder_with_provider(crypto_provider())
//!         .with_safe_default_protocol_versions()?
//!         .with_root_certificates(roots)
//!         .with_no_client_auth();
//!     let tls = Arc::new(tls);
//!     let stream = connect("smtp.example.com", 587).await?;
//!     let client = Client::from_stream(stream).await?;
//!     let client = client.ehlo("client.example.com").await?;
//!     let client = client.starttls("smtp.example.com", "client.example.com", tls).await?;
//!     let client = client.authenticate("user@example.com", "password").await?;
//!
//!     let client = client.mail_from(Address::new("sender@example.com")?).await?;
//!     let client = client.rcpt_to(Address::new("recipient@example.com")?).await?;
//!     let client = client.data().await?;
//!     let client = client.send_message(b"Subject: Test\r\n\r\nHello\r\n").await?;
//!
//!     client.quit().await
//! }
//! ```
//!
//! ## Connection States
//!
//! ```text
//! Connected ── authenticate() ──→ Authenticated
//!     │                               │
//!     └──────── mail_from() ──────────┘
//!                   ↓
//!            MailTransaction ── rcpt_to() ──→ RecipientAdded ── data() ──→ Data
//!                                                                           │
//!            Connected ←──────────────── send_message() ────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod types;

pub use connection::{
    Authenticated, Client, Connected, Data, MailTransaction, ReadyForMail, RecipientAdded,
    ServerInfo, SmtpConnection,
};
pub use error::{Error, Result};
pub use types::{Address, AuthMechanism, Extension, Reply, ReplyCode};
