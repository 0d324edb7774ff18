//! Envelope address type.

use crate::error::{Error, Result};

/// Email address as used in `MAIL FROM` / `RCPT TO`.
///
/// Only the bare `local@domain` form is accepted. Display names belong in
/// the message headers, not the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Creates a new address from a string, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid.
    pub fn new(addr: impl Into<String>) -> Result<Self> {
        let addr = addr.into().trim().to_string();
        Self::validate(&addr)?;
        Ok(Self(addr))
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the address needs the SMTPUTF8 extension.
    #[must_use]
    pub fn is_ascii(&self) -> bool {
        self.0.is_ascii()
    }

    fn validate(addr: &str) -> Result<()> {
        if addr.is_empty() {
            return Err(Error::InvalidAddress("Address cannot be empty".into()));
        }

        // Anything that could terminate the command line or the path early.
        if addr
            .chars()
            .any(|c| matches!(c, '<' | '>' | '\r' | '\n') || c.is_whitespace())
        {
            return Err(Error::InvalidAddress(format!(
                "Address contains forbidden characters: {addr:?}"
            )));
        }

        let Some((local, domain)) = addr.rsplit_once('@') else {
            return Err(Error::InvalidAddress(format!(
                "Address must contain @: {addr}"
            )));
        };

        if local.is_empty() || domain.is_empty() {
            return Err(Error::InvalidAddress(format!(
                "Local and domain parts cannot be empty: {addr}"
            )));
        }

        Ok(())
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}
