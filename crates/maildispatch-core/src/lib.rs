//! # maildispatch-core
//!
//! Transport-agnostic mail dispatch over SMTP.
//!
//! This crate provides:
//! - The mail data model ([`MailItem`], [`MailAddress`], [`MailAttachment`])
//! - SMTP configuration with TOML loading and validation
//! - Two interchangeable drivers: [`RichDriver`] on the workspace SMTP
//!   client with a pluggable certificate [`TrustEvaluator`], and
//!   [`MinimalDriver`] on `lettre`
//! - Classification of delivery faults into [`SmtpResponse`]s
//!
//! ## Quick Start
//!
//! ```ignore
//! use maildispatch_core::{MailItem, Mailer, SmtpConfig};
//!
//! let config = SmtpConfig::new("smtp.example.com", 587)
//!     .with_credentials("user", "secret")
//!     .with_sender("noreply@example.com");
//! let mailer = Mailer::rich(config)?;
//!
//! let item: MailItem = MailItem::new("Welcome", "<p>Hello!</p>")
//!     .to("alice@example.com")
//!     .process_id("signup-42");
//!
//! let response = mailer.send(&item).await;
//! if !response.is_success() {
//!     eprintln!("{:?}", response.errors());
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod classify;
pub mod compose;
pub mod config;
pub mod driver;
mod error;
mod mailer;
pub mod model;
mod response;
mod transport;
pub mod trust;

pub use classify::{AUTHENTICATION_FAILED, classify};
pub use compose::{ComposeError, Envelope};
pub use config::{ConfigError, SmtpConfig, validate_config};
pub use driver::{DriverKind, MinimalDriver, RichDriver};
pub use error::{Error, Result};
pub use mailer::Mailer;
pub use model::{MailAddress, MailAttachment, MailItem};
pub use response::{ErrorBody, FailureKind, GENERIC_FAILURE, SmtpResponse};
pub use transport::{SendError, Transport};
pub use trust::{
    BypassTrustEvaluator, ChainElement, PolicyErrors, StrictTrustEvaluator, TrustDecision,
    TrustEvaluator,
};
