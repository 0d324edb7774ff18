//! SMTP configuration model.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Port used when the configuration leaves it unset (0).
pub const DEFAULT_PORT: u16 = 587;

/// Port on which TLS starts before the SMTP greeting.
pub const IMPLICIT_TLS_PORT: u16 = 465;

/// Environment variable that overrides the configured password.
pub const PASSWORD_ENV: &str = "MAILDISPATCH_SMTP_PASSWORD";

/// SMTP server configuration shared read-only by every send.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    /// Server hostname.
    pub host: String,
    /// Server port; 0 means [`DEFAULT_PORT`].
    pub port: u16,
    /// Username for authentication; empty skips authentication.
    pub username: String,
    /// Password for authentication.
    pub password: String,
    /// Default sender address when a mail item names none.
    pub sender: String,
    /// Accept any server certificate.
    pub bypass_certificate: bool,
}

impl SmtpConfig {
    /// Creates a configuration for a host and port.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Sets the credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Sets the default sender address.
    #[must_use]
    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = sender.into();
        self
    }

    /// Sets whether certificate validation is bypassed.
    #[must_use]
    pub const fn with_bypass_certificate(mut self, bypass: bool) -> Self {
        self.bypass_certificate = bypass;
        self
    }

    /// Returns the port to connect to, mapping 0 to [`DEFAULT_PORT`].
    #[must_use]
    pub const fn effective_port(&self) -> u16 {
        if self.port == 0 {
            DEFAULT_PORT
        } else {
            self.port
        }
    }

    /// Returns true if TLS starts immediately on connect.
    #[must_use]
    pub const fn implicit_tls(&self) -> bool {
        self.effective_port() == IMPLICIT_TLS_PORT
    }

    /// Returns true if the driver should authenticate.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.username.trim().is_empty()
    }

    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this structure.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Loads a configuration file and applies the password override from
    /// [`PASSWORD_ENV`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let config = Self::from_toml_str(&text)?;
        Ok(config.with_password_override(std::env::var(PASSWORD_ENV).ok()))
    }

    /// Replaces the password when an override is present and non-empty.
    #[must_use]
    pub fn with_password_override(mut self, password: Option<String>) -> Self {
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            self.password = password;
        }
        self
    }
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("sender", &self.sender)
            .field("bypass_certificate", &self.bypass_certificate)
            .finish()
    }
}
