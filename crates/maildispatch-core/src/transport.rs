//! The delivery seam shared by every driver.

use crate::compose::ComposeError;
use crate::model::MailItem;
use crate::response::FailureKind;
use std::future::Future;
use thiserror::Error;

/// Why a delivery attempt failed.
///
/// Both drivers report through this one taxonomy so the classifier treats
/// them alike.
#[derive(Debug, Error)]
pub enum SendError {
    /// The server rejected a command.
    #[error("{message} ({code})")]
    Command {
        /// SMTP reply code.
        code: u16,
        /// Server text.
        message: String,
    },

    /// The dialogue with the server broke down.
    #[error("{0}")]
    Protocol(String),

    /// The server rejected the credentials.
    #[error("{0}")]
    Authentication(String),

    /// The message could not be composed.
    #[error(transparent)]
    Compose(#[from] ComposeError),

    /// TLS setup or handshake failed.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Network I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The item names no To, Cc or Bcc recipient.
    #[error("No recipients specified")]
    NoRecipients,

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

impl SendError {
    /// Returns the SMTP reply code, if the server sent one.
    #[must_use]
    pub const fn code(&self) -> Option<u16> {
        match self {
            Self::Command { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns the classification bucket for this fault.
    #[must_use]
    pub const fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Command { .. } => FailureKind::Connection,
            Self::Protocol(_) => FailureKind::Protocol,
            Self::Authentication(_) => FailureKind::Authentication,
            _ => FailureKind::Generic,
        }
    }
}

impl From<maildispatch_smtp::Error> for SendError {
    fn from(err: maildispatch_smtp::Error) -> Self {
        use maildispatch_smtp::Error as Smtp;

        match err {
            Smtp::SmtpError { code, message } => Self::Command { code, message },
            Smtp::AuthenticationFailed { code, message } => {
                Self::Authentication(format!("{code} {message}"))
            }
            Smtp::Protocol(message) | Smtp::InvalidState(message) => Self::Protocol(message),
            Smtp::NotSupported(feature) => {
                Self::Protocol(format!("server does not support {feature}"))
            }
            Smtp::InvalidAddress(address) => Self::Compose(ComposeError::InvalidAddress(address)),
            Smtp::Io(err) => Self::Io(err),
            Smtp::Tls(err) => Self::Tls(err.to_string()),
        }
    }
}

/// A backend that performs one SMTP send.
///
/// Implementations open a fresh connection per call and never retry.
pub trait Transport: Send + Sync {
    /// Delivers one item.
    ///
    /// # Errors
    ///
    /// Returns the reason delivery failed.
    fn deliver<E: Send + Sync>(
        &self,
        item: &MailItem<E>,
    ) -> impl Future<Output = Result<(), SendError>> + Send;
}
