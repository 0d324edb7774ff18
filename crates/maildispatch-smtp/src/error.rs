//! Error types for SMTP operations.

use std::io;

/// Result type alias for SMTP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SMTP error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// TLS error.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// Server rejected a command.
    #[error("SMTP error {code}: {message}")]
    SmtpError {
        /// Reply code (e.g., 550).
        code: u16,
        /// Error message from server.
        message: String,
    },

    /// Server rejected the supplied credentials.
    #[error("Authentication failed ({code}): {message}")]
    AuthenticationFailed {
        /// Reply code (usually 535).
        code: u16,
        /// Error message from server.
        message: String,
    },

    /// Server dialogue did not follow RFC 5321.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Feature not supported by server.
    #[error("Server does not support {0}")]
    NotSupported(String),

    /// Invalid state for operation.
    #[error("Invalid state for operation: {0}")]
    InvalidState(String),
}

impl Error {
    /// Creates an SMTP error from a reply code and message.
    #[must_use]
    pub fn smtp_error(code: u16, message: impl Into<String>) -> Self {
        Self::SmtpError {
            code,
            message: message.into(),
        }
    }

    /// Returns the server reply code carried by this error, if any.
    #[must_use]
    pub const fn code(&self) -> Option<u16> {
        match self {
            Self::SmtpError { code, .. } | Self::AuthenticationFailed { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn code_is_exposed_for_server_errors() {
        assert_eq!(Error::smtp_error(550, "no such user").code(), Some(550));
        let auth = Error::AuthenticationFailed {
            code: 535,
            message: "bad credentials".into(),
        };
        assert_eq!(auth.code(), Some(535));
        assert_eq!(Error::Protocol("garbage".into()).code(), None);
    }

    #[test]
    fn display_includes_code() {
        let err = Error::smtp_error(550, "mailbox unavailable");
        assert_eq!(err.to_string(), "SMTP error 550: mailbox unavailable");
    }
}
