//! SMTP configuration.

mod model;
mod validation;

pub use model::{DEFAULT_PORT, IMPLICIT_TLS_PORT, PASSWORD_ENV, SmtpConfig};
pub use validation::{ConfigError, ValidationResult, validate_config};
