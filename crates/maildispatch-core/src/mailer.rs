//! Front door: send an item and get a response, never an error.

use crate::classify::classify;
use crate::config::SmtpConfig;
use crate::driver::{MinimalDriver, RichDriver};
use crate::error::Result;
use crate::model::MailItem;
use crate::response::SmtpResponse;
use crate::transport::{SendError, Transport};
use std::sync::Arc;
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::{info, instrument};

/// Sends mail items through a [`Transport`] and classifies the outcome.
#[derive(Debug, Clone)]
pub struct Mailer<T> {
    transport: T,
}

impl Mailer<RichDriver> {
    /// Creates a mailer on the workspace SMTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn rich(config: SmtpConfig) -> Result<Self> {
        Ok(Self::new(RichDriver::new(Arc::new(config))?))
    }
}

impl Mailer<MinimalDriver> {
    /// Creates a mailer on `lettre`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn minimal(config: SmtpConfig) -> Result<Self> {
        Ok(Self::new(MinimalDriver::new(Arc::new(config))?))
    }
}

impl<T: Transport> Mailer<T> {
    /// Wraps a transport.
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Returns the transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends one item.
    ///
    /// Success echoes the item's entity; any fault is classified into a
    /// failure response.
    #[instrument(
        skip_all,
        fields(
            process_id = %item.process_id,
            stream = %item.stream_identifier,
            service = %item.service_identifier,
        )
    )]
    pub async fn send<E: Send + Sync>(&self, item: &MailItem<E>) -> SmtpResponse<E> {
        info!(
            recipients = item.to.len() + item.cc.len() + item.bcc.len(),
            attachments = item.attachments.len(),
            "Sending email"
        );

        match self.transport.deliver(item).await {
            Ok(()) => {
                info!("Email sent");
                SmtpResponse::success(item.entity.clone())
            }
            Err(fault) => classify(fault, item),
        }
    }

    /// Sends one item, blocking the calling thread.
    ///
    /// Outside a runtime this runs [`send`](Self::send) on a private
    /// current-thread runtime. On a multi-thread runtime (a worker or a
    /// `spawn_blocking` thread) it blocks in place on that runtime. A
    /// current-thread runtime cannot be blocked from within, so there it
    /// returns a failure instead.
    pub fn send_blocking<E: Send + Sync>(&self, item: &MailItem<E>) -> SmtpResponse<E> {
        if let Ok(handle) = Handle::try_current() {
            if handle.runtime_flavor() == RuntimeFlavor::CurrentThread {
                let fault = SendError::Other(
                    "send_blocking cannot run on a current-thread runtime; use send".into(),
                );
                return classify(fault, item);
            }
            return tokio::task::block_in_place(|| handle.block_on(self.send(item)));
        }

        match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime.block_on(self.send(item)),
            Err(err) => classify(SendError::Io(err), item),
        }
    }
}
