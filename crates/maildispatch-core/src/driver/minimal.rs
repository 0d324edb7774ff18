//! Driver on `lettre`.

use super::checked;
use crate::compose::compose_lettre;
use crate::config::SmtpConfig;
use crate::error::Result;
use crate::model::MailItem;
use crate::transport::{SendError, Transport};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use maildispatch_smtp::ReplyCode;
use std::sync::Arc;
use tracing::{debug, warn};

/// Sends through `lettre`.
///
/// TLS is mandatory: implicit on port 465, required STARTTLS elsewhere.
/// Certificates are checked against the webpki roots unless
/// `bypass_certificate` is set. One connection per send, no pool.
#[derive(Debug, Clone)]
pub struct MinimalDriver {
    config: Arc<SmtpConfig>,
}

impl MinimalDriver {
    /// Creates a driver.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: Arc<SmtpConfig>) -> Result<Self> {
        checked(&config)?;
        if config.bypass_certificate {
            warn!(host = %config.host, "Certificate validation is disabled");
        }
        Ok(Self { config })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &SmtpConfig {
        &self.config
    }

    fn transport(&self) -> std::result::Result<AsyncSmtpTransport<Tokio1Executor>, SendError> {
        let host = self.config.host.as_str();
        let parameters = TlsParameters::builder(host.to_owned())
            .dangerous_accept_invalid_certs(self.config.bypass_certificate)
            .build_rustls()
            .map_err(|e| SendError::Tls(e.to_string()))?;

        let tls = if self.config.implicit_tls() {
            Tls::Wrapper(parameters)
        } else {
            Tls::Required(parameters)
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(self.config.effective_port())
            .tls(tls);
        if self.config.has_credentials() {
            builder = builder.credentials(Credentials::new(
                self.config.username.clone(),
                self.config.password.clone(),
            ));
        }
        Ok(builder.build())
    }
}

impl Transport for MinimalDriver {
    async fn deliver<E: Send + Sync>(
        &self,
        item: &MailItem<E>,
    ) -> std::result::Result<(), SendError> {
        if item.has_no_recipients() {
            return Err(SendError::NoRecipients);
        }
        let message = compose_lettre(item, &self.config)?;
        let transport = self.transport()?;

        debug!(
            host = %self.config.host,
            port = self.config.effective_port(),
            "Sending via lettre"
        );
        let response = transport.send(message).await.map_err(from_lettre)?;
        debug!(code = %response.code(), "Message accepted");
        Ok(())
    }
}

/// Maps a `lettre` error onto the shared taxonomy by reply code, the same
/// way the workspace client classifies replies.
fn from_lettre(err: lettre::transport::smtp::Error) -> SendError {
    if let Some(code) = err.status().map(u16::from) {
        let message = err.to_string();
        if ReplyCode::new(code).is_auth_rejection() {
            return SendError::Authentication(message);
        }
        return SendError::Command { code, message };
    }
    if err.is_tls() {
        return SendError::Tls(err.to_string());
    }
    if err.is_response() {
        return SendError::Protocol(err.to_string());
    }
    SendError::Other(err.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn empty_host_is_rejected() {
        let err = MinimalDriver::new(Arc::new(SmtpConfig::new("  ", 465))).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn transport_builds_for_both_tls_modes() {
        for port in [0, 465, 2525] {
            let config = SmtpConfig::new("smtp.example.com", port)
                .with_credentials("user", "secret")
                .with_bypass_certificate(port == 2525);
            let driver = MinimalDriver::new(Arc::new(config)).unwrap();
            assert!(driver.transport().is_ok());
        }
    }

    #[tokio::test]
    async fn no_recipients_fails_before_connecting() {
        let config = SmtpConfig::new("127.0.0.1", 9).with_sender("me@example.com");
        let driver = MinimalDriver::new(Arc::new(config)).unwrap();
        let item: MailItem = MailItem::new("s", "b");
        let err = driver.deliver(&item).await.unwrap_err();
        assert!(matches!(err, SendError::NoRecipients));
    }

    #[tokio::test]
    async fn refused_connection_is_generic() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = SmtpConfig::new("127.0.0.1", port).with_sender("me@example.com");
        let driver = MinimalDriver::new(Arc::new(config)).unwrap();
        let item: MailItem = MailItem::new("s", "b").to("a@example.com");
        let err = driver.deliver(&item).await.unwrap_err();
        assert_eq!(err.failure_kind(), crate::response::FailureKind::Generic);
    }
}
