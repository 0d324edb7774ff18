//! Configuration validation.

use super::model::SmtpConfig;

/// Problem found in an [`SmtpConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// SMTP host is empty.
    EmptyHost,
    /// A password is set but no username to go with it.
    PasswordWithoutUsername,
    /// Default sender address is present but malformed.
    InvalidSender,
}

impl ConfigError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::EmptyHost => "SMTP server is required",
            Self::PasswordWithoutUsername => "SMTP username is required when a password is set",
            Self::InvalidSender => "Invalid sender address format",
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyHost => "host",
            Self::PasswordWithoutUsername => "username",
            Self::InvalidSender => "sender",
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ConfigError {}

/// Result of validating a configuration.
pub type ValidationResult = Result<(), Vec<ConfigError>>;

/// Validate an SMTP configuration.
///
/// Returns `Ok(())` if valid, or every problem found.
///
/// # Errors
///
/// Returns a vector of `ConfigError` if any fields are invalid.
pub fn validate_config(config: &SmtpConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if config.host.trim().is_empty() {
        errors.push(ConfigError::EmptyHost);
    }
    if config.username.trim().is_empty() && !config.password.is_empty() {
        errors.push(ConfigError::PasswordWithoutUsername);
    }
    if !config.sender.trim().is_empty() && !is_valid_email(&config.sender) {
        errors.push(ConfigError::InvalidSender);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Basic email validation: one `@`, non-empty local part, dotted domain.
pub(crate) fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.trim().split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|part| !part.is_empty())
        && !email.trim().contains(char::is_whitespace)
}
