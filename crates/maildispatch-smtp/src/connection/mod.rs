//! SMTP connection management with type-state pattern.

mod client;
mod stream;

pub use client::{
    Authenticated, Client, Connected, Data, MailTransaction, ReadyForMail, RecipientAdded,
    SmtpConnection,
};
pub use stream::{SmtpStream, connect, connect_tls, crypto_provider};

use crate::types::{AuthMechanism, Extension};

/// Server capabilities from the greeting and EHLO response.
#[derive(Debug, Clone, Default)]
pub struct ServerInfo {
    /// Server hostname from greeting.
    pub hostname: String,
    /// Extensions advertised by the latest EHLO, in order.
    pub extensions: Vec<Extension>,
}

impl ServerInfo {
    /// Checks if the server advertised an extension.
    #[must_use]
    pub fn supports(&self, ext: &Extension) -> bool {
        self.extensions.contains(ext)
    }

    /// Checks if STARTTLS is advertised.
    #[must_use]
    pub fn supports_starttls(&self) -> bool {
        self.supports(&Extension::StartTls)
    }

    /// Checks if SMTPUTF8 is advertised.
    #[must_use]
    pub fn supports_smtputf8(&self) -> bool {
        self.supports(&Extension::SmtpUtf8)
    }

    /// Returns advertised authentication mechanisms this client understands.
    #[must_use]
    pub fn auth_mechanisms(&self) -> Vec<AuthMechanism> {
        self.extensions
            .iter()
            .filter_map(|ext| match ext {
                Extension::Auth(mechanisms) => Some(mechanisms.iter().copied()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Picks the mechanism to authenticate with, PLAIN before LOGIN.
    #[must_use]
    pub fn preferred_auth_mechanism(&self) -> Option<AuthMechanism> {
        let advertised = self.auth_mechanisms();
        [AuthMechanism::Plain, AuthMechanism::Login]
            .into_iter()
            .find(|m| advertised.contains(m))
    }

    fn replace_extensions(&mut self, ehlo_lines: &[String]) {
        // First line is the server's own greeting.
        self.extensions = ehlo_lines
            .iter()
            .skip(1)
            .map(|line| Extension::parse(line))
            .collect();
    }
}
