//! SMTP extension types.

/// SMTP extensions discovered from the EHLO response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Extension {
    /// STARTTLS - TLS upgrade
    StartTls,
    /// AUTH - Authentication
    Auth(Vec<AuthMechanism>),
    /// SIZE - Maximum message size
    Size(Option<usize>),
    /// 8BITMIME - 8-bit MIME transport
    EightBitMime,
    /// SMTPUTF8 - UTF-8 email addresses
    SmtpUtf8,
    /// Anything this client does not act on
    Other(String),
}

impl Extension {
    /// Parses an extension line from the EHLO response.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        let Some(keyword) = words.next() else {
            return Self::Other(line.to_string());
        };

        match keyword.to_ascii_uppercase().as_str() {
            "STARTTLS" => Self::StartTls,
            // Some older servers advertise "AUTH=LOGIN PLAIN".
            kw if kw == "AUTH" || kw.starts_with("AUTH=") => {
                let inline = kw.strip_prefix("AUTH=").filter(|m| !m.is_empty());
                let mechanisms = inline
                    .into_iter()
                    .chain(words)
                    .filter_map(AuthMechanism::parse)
                    .collect();
                Self::Auth(mechanisms)
            }
            "SIZE" => Self::Size(words.next().and_then(|s| s.parse().ok())),
            "8BITMIME" => Self::EightBitMime,
            "SMTPUTF8" => Self::SmtpUtf8,
            _ => Self::Other(line.to_string()),
        }
    }
}

/// SASL authentication mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthMechanism {
    /// PLAIN - single round trip
    Plain,
    /// LOGIN - username and password prompted separately
    Login,
}

impl AuthMechanism {
    /// Parses an authentication mechanism name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "PLAIN" => Some(Self::Plain),
            "LOGIN" => Some(Self::Login),
            _ => None,
        }
    }

    /// Returns the mechanism name as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "PLAIN",
            Self::Login => "LOGIN",
        }
    }
}
