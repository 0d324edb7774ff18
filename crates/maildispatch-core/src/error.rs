//! Error types for the core library.

use crate::config::ConfigError;
use thiserror::Error;

/// Errors raised while setting up mail dispatch.
///
/// Failures of an individual send never surface here; they are reported in
/// the [`SmtpResponse`](crate::SmtpResponse).
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid TOML.
    #[error("Invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration failed validation.
    #[error("Invalid configuration: {}", join(.0))]
    InvalidConfig(Vec<ConfigError>),

    /// TLS setup failed.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),
}

fn join(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
