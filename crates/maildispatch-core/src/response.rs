//! Normalized outcome of a send attempt.

use crate::transport::SendError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::sync::Arc;

/// Message used when a failure is reported without any text.
pub const GENERIC_FAILURE: &str = "An unknown error occured when sending an email";

/// Classification bucket for a failed send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// The server rejected a command.
    Connection,
    /// The SMTP dialogue broke down.
    Protocol,
    /// The server rejected the credentials.
    Authentication,
    /// Anything else.
    Generic,
}

impl FailureKind {
    /// Returns the machine-readable code used in [`ErrorBody`].
    #[must_use]
    pub const fn error_code(self) -> &'static str {
        match self {
            Self::Connection => "SMTP_CONNECTION",
            Self::Protocol => "SMTP_PROTOCOL",
            Self::Authentication => "SMTP_AUTHENTICATION",
            Self::Generic => "SMTP_GENERIC",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.error_code())
    }
}

/// JSON error payload for HTTP-facing callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// First failure message.
    pub message: String,
    /// One of the `SMTP_*` codes.
    pub error_code: String,
    /// Every failure message.
    pub details: Vec<String>,
}

/// Result of one send: either success with the caller's entity echoed back,
/// or failure with at least one message.
pub struct SmtpResponse<E = ()> {
    success: bool,
    result: Option<Arc<E>>,
    errors: Vec<String>,
    fault: Option<Arc<SendError>>,
}

impl<E> SmtpResponse<E> {
    /// A successful send.
    #[must_use]
    pub const fn success(entity: Option<Arc<E>>) -> Self {
        Self {
            success: true,
            result: entity,
            errors: Vec::new(),
            fault: None,
        }
    }

    /// A failed send. An empty message list becomes [`GENERIC_FAILURE`].
    #[must_use]
    pub fn failure(
        messages: Vec<String>,
        entity: Option<Arc<E>>,
        fault: Option<Arc<SendError>>,
    ) -> Self {
        let errors = if messages.is_empty() {
            vec![GENERIC_FAILURE.to_string()]
        } else {
            messages
        };
        Self {
            success: false,
            result: entity,
            errors,
            fault,
        }
    }

    /// Returns true if the message was accepted by the server.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.success
    }

    /// Returns the caller's entity, if one was attached to the item.
    #[must_use]
    pub const fn result(&self) -> Option<&Arc<E>> {
        self.result.as_ref()
    }

    /// Returns the failure messages; empty on success.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Returns the underlying fault, if any.
    #[must_use]
    pub fn fault(&self) -> Option<&SendError> {
        self.fault.as_deref()
    }

    /// Returns the failure bucket, or `None` on success.
    #[must_use]
    pub fn failure_kind(&self) -> Option<FailureKind> {
        if self.success {
            return None;
        }
        match self.fault() {
            Some(fault) => Some(fault.failure_kind()),
            None => Some(FailureKind::Generic),
        }
    }

    /// Renders the failure as a JSON-ready body, or `None` on success.
    #[must_use]
    pub fn error_body(&self) -> Option<ErrorBody> {
        let kind = self.failure_kind()?;
        Some(ErrorBody {
            message: self.errors.first().cloned().unwrap_or_default(),
            error_code: kind.error_code().to_string(),
            details: self.errors.clone(),
        })
    }

    /// Renders the outcome for logs and command-line output.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self.error_body() {
            None => json!({ "success": true, "errors": [] }),
            Some(body) => json!({ "success": false, "errors": self.errors, "error": body }),
        }
    }
}

impl<E> Clone for SmtpResponse<E> {
    fn clone(&self) -> Self {
        Self {
            success: self.success,
            result: self.result.clone(),
            errors: self.errors.clone(),
            fault: self.fault.clone(),
        }
    }
}

impl<E> fmt::Debug for SmtpResponse<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpResponse")
            .field("success", &self.success)
            .field("has_result", &self.result.is_some())
            .field("errors", &self.errors)
            .field("fault", &self.fault)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn success_has_no_errors() {
        let entity = Arc::new(5_u32);
        let response = SmtpResponse::success(Some(Arc::clone(&entity)));
        assert!(response.is_success());
        assert!(response.errors().is_empty());
        assert!(Arc::ptr_eq(response.result().unwrap(), &entity));
        assert!(response.failure_kind().is_none());
        assert!(response.error_body().is_none());
    }

    #[test]
    fn empty_failure_gets_generic_message() {
        let response: SmtpResponse = SmtpResponse::failure(Vec::new(), None, None);
        assert!(!response.is_success());
        assert_eq!(response.errors(), [GENERIC_FAILURE]);
        assert_eq!(response.failure_kind(), Some(FailureKind::Generic));
    }

    #[test]
    fn error_body_is_camel_case() {
        let fault = Arc::new(SendError::Authentication("535".into()));
        let response: SmtpResponse =
            SmtpResponse::failure(vec!["Authentication failed".into()], None, Some(fault));
        let body = response.error_body().unwrap();
        assert_eq!(body.error_code, "SMTP_AUTHENTICATION");

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["errorCode"], "SMTP_AUTHENTICATION");
        assert_eq!(json["message"], "Authentication failed");
        assert_eq!(json["details"][0], "Authentication failed");

        let outcome = response.to_json();
        assert_eq!(outcome["success"], false);
        assert_eq!(outcome["error"]["errorCode"], "SMTP_AUTHENTICATION");
    }

    #[test]
    fn kind_follows_fault() {
        let fault = Arc::new(SendError::Command {
            code: 550,
            message: "No such user".into(),
        });
        let response: SmtpResponse = SmtpResponse::failure(vec!["x".into()], None, Some(fault));
        assert_eq!(response.failure_kind(), Some(FailureKind::Connection));
        assert_eq!(response.fault().and_then(SendError::code), Some(550));
    }
}
