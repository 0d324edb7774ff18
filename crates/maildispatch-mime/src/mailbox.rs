//! Header mailbox (`Display Name <local@domain>`).

use crate::encoding::encode_phrase;
use crate::error::{Error, Result};
use std::fmt;

/// A mailbox as written in `From`, `To`, `Cc` and `Reply-To` headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    name: Option<String>,
    email: String,
}

impl Mailbox {
    /// Creates a mailbox from a bare address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is not `local@domain` or contains
    /// characters that would break the header.
    pub fn new(email: impl Into<String>) -> Result<Self> {
        let email = email.into().trim().to_string();
        validate(&email)?;
        Ok(Self { name: None, email })
    }

    /// Attaches a display name. Blank names are ignored.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        let name = name.trim();
        self.name = (!name.is_empty()).then(|| name.to_string());
        self
    }

    /// Returns the bare address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the display name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the domain part of the address.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.email.rsplit_once('@').map_or("", |(_, d)| d)
    }
}

fn validate(email: &str) -> Result<()> {
    if email
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '<' | '>' | ',' | '"'))
    {
        return Err(Error::InvalidAddress(format!("{email:?}")));
    }
    match email.rsplit_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(Error::InvalidAddress(format!("{email:?}"))),
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} <{}>", encode_phrase(name), self.email),
            None => f.write_str(&self.email),
        }
    }
}
