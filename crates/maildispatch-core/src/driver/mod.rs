//! Transport drivers.
//!
//! [`RichDriver`] speaks SMTP through the workspace client and consults a
//! [`TrustEvaluator`](crate::trust::TrustEvaluator) during the TLS
//! handshake. [`MinimalDriver`] hands the message to `lettre`.

mod minimal;
mod rich;

pub use minimal::MinimalDriver;
pub use rich::RichDriver;

use crate::config::{SmtpConfig, validate_config};
use crate::error::{Error, Result};
use std::str::FromStr;

/// EHLO name used when none is configured.
pub const DEFAULT_CLIENT_HOSTNAME: &str = "localhost";

/// Which driver to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DriverKind {
    /// [`RichDriver`].
    #[default]
    Rich,
    /// [`MinimalDriver`].
    Minimal,
}

impl FromStr for DriverKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rich" => Ok(Self::Rich),
            "minimal" => Ok(Self::Minimal),
            other => Err(Error::Config(format!("unknown driver: {other}"))),
        }
    }
}

fn checked(config: &SmtpConfig) -> Result<()> {
    validate_config(config).map_err(Error::InvalidConfig)
}
