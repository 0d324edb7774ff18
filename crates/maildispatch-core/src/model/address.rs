//! Recipient / sender address.

use serde::{Deserialize, Serialize};

/// Display name plus email address, used for To, Cc, Bcc and Reply-To.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MailAddress {
    /// Name shown to the recipient; may be empty.
    #[serde(default)]
    pub display_name: String,
    /// Email address.
    pub address: String,
}

impl MailAddress {
    /// Creates an address without a display name.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            display_name: String::new(),
            address: address.into(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }
}

impl From<&str> for MailAddress {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

impl std::fmt::Display for MailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.display_name.trim().is_empty() {
            f.write_str(&self.address)
        } else {
            write!(f, "{} <{}>", self.display_name, self.address)
        }
    }
}
