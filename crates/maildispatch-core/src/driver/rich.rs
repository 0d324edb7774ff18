//! Driver on the workspace SMTP client.

use super::{DEFAULT_CLIENT_HOSTNAME, checked};
use crate::compose::{ComposedMessage, compose_mime};
use crate::config::SmtpConfig;
use crate::error::Result;
use crate::model::MailItem;
use crate::transport::{SendError, Transport};
use crate::trust::{BypassTrustEvaluator, StrictTrustEvaluator, TrustEvaluator, client_config};
use maildispatch_smtp::connection::{connect, connect_tls};
use maildispatch_smtp::{Address, Client, ReadyForMail, SmtpConnection};
use rustls::ClientConfig;
use std::sync::Arc;
use tracing::{debug, warn};

/// Sends through the workspace SMTP client.
///
/// Every call opens its own connection: implicit TLS on port 465,
/// otherwise plain TCP upgraded with STARTTLS when the server offers it.
/// Certificates are judged by the driver's trust evaluator.
#[derive(Debug, Clone)]
pub struct RichDriver {
    config: Arc<SmtpConfig>,
    tls: Arc<ClientConfig>,
    client_hostname: String,
}

impl RichDriver {
    /// Creates a driver. `bypass_certificate` selects
    /// [`BypassTrustEvaluator`], otherwise [`StrictTrustEvaluator`] is used.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or TLS cannot be
    /// set up.
    pub fn new(config: Arc<SmtpConfig>) -> Result<Self> {
        let evaluator: Arc<dyn TrustEvaluator> = if config.bypass_certificate {
            warn!(host = %config.host, "Certificate validation is disabled");
            Arc::new(BypassTrustEvaluator)
        } else {
            Arc::new(StrictTrustEvaluator)
        };
        Self::with_evaluator(config, evaluator)
    }

    /// Creates a driver with a custom trust evaluator.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or TLS cannot be
    /// set up.
    pub fn with_evaluator(
        config: Arc<SmtpConfig>,
        evaluator: Arc<dyn TrustEvaluator>,
    ) -> Result<Self> {
        checked(&config)?;
        Ok(Self {
            tls: client_config(evaluator)?,
            config,
            client_hostname: DEFAULT_CLIENT_HOSTNAME.to_string(),
        })
    }

    /// Sets the name announced in EHLO.
    #[must_use]
    pub fn with_client_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.client_hostname = hostname.into();
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &SmtpConfig {
        &self.config
    }

    async fn transmit(&self, composed: &ComposedMessage) -> std::result::Result<(), SendError> {
        let host = self.config.host.as_str();
        let port = self.config.effective_port();

        debug!(
            host,
            port,
            implicit_tls = self.config.implicit_tls(),
            "Connecting"
        );
        let stream = if self.config.implicit_tls() {
            connect_tls(host, port, Arc::clone(&self.tls)).await?
        } else {
            connect(host, port).await?
        };

        let client = Client::from_stream(stream).await?;
        let client = client.ehlo(&self.client_hostname).await?;

        let client = if !client.is_tls() && client.server_info().supports_starttls() {
            debug!(host, "Upgrading with STARTTLS");
            client
                .starttls(host, &self.client_hostname, Arc::clone(&self.tls))
                .await?
        } else {
            client
        };
        if !client.is_tls() {
            debug!(
                host,
                "Server does not offer STARTTLS, continuing in plain text"
            );
        }

        if self.config.has_credentials() {
            debug!(host, username = %self.config.username, "Authenticating");
            let client = client
                .authenticate(&self.config.username, &self.config.password)
                .await?;
            send_transaction(client, composed).await
        } else {
            send_transaction(client, composed).await
        }
    }
}

impl Transport for RichDriver {
    async fn deliver<E: Send + Sync>(
        &self,
        item: &MailItem<E>,
    ) -> std::result::Result<(), SendError> {
        if item.has_no_recipients() {
            return Err(SendError::NoRecipients);
        }
        let composed = compose_mime(item, &self.config)?;
        self.transmit(&composed).await
    }
}

async fn send_transaction<S: ReadyForMail>(
    client: Client<S>,
    composed: &ComposedMessage,
) -> std::result::Result<(), SendError> {
    let envelope = &composed.envelope;
    let mut recipients = envelope.recipients.iter();
    let first = recipients.next().ok_or(SendError::NoRecipients)?;

    let client = client
        .mail_from(Address::new(envelope.from.as_str())?)
        .await?;
    let mut client = client.rcpt_to(Address::new(first.as_str())?).await?;
    for recipient in recipients {
        client = client.rcpt_to(Address::new(recipient.as_str())?).await?;
    }

    let client = client.data().await?;
    let client = client.send_message(&composed.message.to_bytes()).await?;
    debug!(recipients = envelope.recipients.len(), "Message accepted");

    // Delivery already succeeded; a failed QUIT changes nothing.
    if let Err(err) = client.quit().await {
        debug!(error = %err, "QUIT failed");
    }
    Ok(())
}
