//! Turns a [`MailItem`] into a message a driver can transmit.
//!
//! Composition is pure: no I/O, no logging. The sender is the item's own
//! `from` when set, otherwise the configured default sender; recipient
//! lists keep their order and Bcc never reaches the headers.

mod envelope;
mod lettre_message;
mod mime;

pub use envelope::Envelope;
pub use lettre_message::compose_lettre;
pub use mime::{ComposedMessage, compose_mime};

use crate::config::SmtpConfig;
use crate::model::{MailAddress, MailItem};
use thiserror::Error;

/// Why a message could not be composed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    /// Neither the item nor the configuration names a sender.
    #[error("No sender address: set the item's from address or a default sender")]
    MissingSender,

    /// An address is malformed.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// The message could not be rendered.
    #[error("Cannot build message: {0}")]
    Message(String),
}

impl From<maildispatch_mime::Error> for ComposeError {
    fn from(err: maildispatch_mime::Error) -> Self {
        match err {
            maildispatch_mime::Error::InvalidAddress(address) => Self::InvalidAddress(address),
            other => Self::Message(other.to_string()),
        }
    }
}

/// Picks the sender for an item.
///
/// # Errors
///
/// Returns [`ComposeError::MissingSender`] if both the item's `from` and the
/// configured sender are blank.
pub fn resolve_sender<E>(
    item: &MailItem<E>,
    config: &SmtpConfig,
) -> Result<MailAddress, ComposeError> {
    let address = item
        .from
        .as_deref()
        .map(str::trim)
        .filter(|from| !from.is_empty())
        .or_else(|| Some(config.sender.trim()).filter(|sender| !sender.is_empty()))
        .ok_or(ComposeError::MissingSender)?;

    let display_name = item
        .sender_display_name
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();

    Ok(MailAddress::new(address).with_name(display_name))
}
