//! Maps delivery faults to caller-facing responses.

use crate::model::MailItem;
use crate::response::{FailureKind, SmtpResponse};
use crate::transport::SendError;
use std::sync::Arc;
use tracing::error;

/// Fixed message for rejected credentials.
pub const AUTHENTICATION_FAILED: &str = "Authentication failed - Invalid user name or password";

/// Wraps a failed delivery into a response, keeping the fault attached.
#[must_use]
pub fn classify<E>(fault: SendError, item: &MailItem<E>) -> SmtpResponse<E> {
    let message = describe(&fault, &item.process_id);
    error!(
        process_id = %item.process_id,
        kind = %fault.failure_kind(),
        "{message}"
    );
    SmtpResponse::failure(vec![message], item.entity.clone(), Some(Arc::new(fault)))
}

/// Renders the caller-facing message for a fault.
#[must_use]
pub fn describe(fault: &SendError, process_id: &str) -> String {
    match (fault.failure_kind(), fault) {
        (FailureKind::Connection, SendError::Command { code, message }) => {
            format!("Error trying to connect: {message} - StatusCode: {code}")
        }
        (FailureKind::Protocol, SendError::Protocol(message)) => {
            format!("Protocol error while trying to connect: {message}")
        }
        (FailureKind::Authentication, _) => AUTHENTICATION_FAILED.to_string(),
        _ => format!("An error occured when sending an email - {process_id}: {fault}"),
    }
}
