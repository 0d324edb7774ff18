//! Trust policy types and the built-in evaluators.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Set of problems found while validating a server certificate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PolicyErrors(u8);

impl PolicyErrors {
    /// No problems.
    pub const NONE: Self = Self(0);
    /// The server presented no usable certificate.
    pub const CERTIFICATE_UNAVAILABLE: Self = Self(1);
    /// The certificate is not valid for the host name.
    pub const NAME_MISMATCH: Self = Self(1 << 1);
    /// The chain does not lead to a trusted root, or an element is invalid.
    pub const CHAIN_ERRORS: Self = Self(1 << 2);

    /// Returns true if no problem is recorded.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if every flag in `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for PolicyErrors {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for PolicyErrors {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for PolicyErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names = [
            (Self::CERTIFICATE_UNAVAILABLE, "certificate unavailable"),
            (Self::NAME_MISMATCH, "name mismatch"),
            (Self::CHAIN_ERRORS, "chain errors"),
        ];
        let set: Vec<&str> = names
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&set.join(", "))
    }
}

/// One certificate of the presented chain, leaf first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainElement {
    /// Subject distinguished name.
    pub subject: String,
    /// Problems found with this element; empty when it is fine.
    pub statuses: Vec<String>,
}

impl ChainElement {
    /// Creates an element with no problems.
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            statuses: Vec::new(),
        }
    }

    /// Appends a problem.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.statuses.push(status.into());
        self
    }
}

/// Outcome of a trust evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustDecision {
    /// Whether the handshake may continue.
    pub accepted: bool,
    /// Human-readable explanation, logged by the verifier.
    pub diagnostic: Option<String>,
}

impl TrustDecision {
    /// Accepts without comment.
    #[must_use]
    pub const fn accept() -> Self {
        Self {
            accepted: true,
            diagnostic: None,
        }
    }

    /// Rejects with an explanation.
    #[must_use]
    pub fn reject(diagnostic: impl Into<String>) -> Self {
        Self {
            accepted: false,
            diagnostic: Some(diagnostic.into()),
        }
    }
}

/// Policy deciding whether a server certificate is acceptable.
pub trait TrustEvaluator: fmt::Debug + Send + Sync {
    /// Decides on the certificate presented by `host`.
    fn evaluate(&self, host: &str, errors: PolicyErrors, chain: &[ChainElement]) -> TrustDecision;
}

/// First line of the diagnostic for a rejected chain.
pub const CHAIN_DIAGNOSTIC_HEADER: &str =
    "The SSL certificate for the server could not be validated for the following reasons:";

/// Accepts only certificates without any policy error.
///
/// A chain problem is rejected with a diagnostic that opens with
/// [`CHAIN_DIAGNOSTIC_HEADER`] and lists every element that has a status,
/// as `• subject` followed by one `\t• status` line each.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictTrustEvaluator;

impl TrustEvaluator for StrictTrustEvaluator {
    fn evaluate(&self, host: &str, errors: PolicyErrors, chain: &[ChainElement]) -> TrustDecision {
        if errors.is_empty() {
            return TrustDecision::accept();
        }
        if errors.contains(PolicyErrors::CERTIFICATE_UNAVAILABLE) {
            return TrustDecision::reject(format!("{host} presented no usable certificate"));
        }
        if errors.contains(PolicyErrors::NAME_MISMATCH) {
            return TrustDecision::reject(format!("certificate is not valid for {host}"));
        }

        let mut lines = vec![CHAIN_DIAGNOSTIC_HEADER.to_string()];
        for element in chain.iter().filter(|e| !e.statuses.is_empty()) {
            lines.push(format!("• {}", element.subject));
            for status in &element.statuses {
                lines.push(format!("\t• {status}"));
            }
        }
        TrustDecision::reject(lines.join("\n"))
    }
}

/// Accepts every certificate, noting that validation was skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct BypassTrustEvaluator;

impl TrustEvaluator for BypassTrustEvaluator {
    fn evaluate(&self, host: &str, errors: PolicyErrors, _chain: &[ChainElement]) -> TrustDecision {
        TrustDecision {
            accepted: true,
            diagnostic: Some(format!(
                "certificate validation bypassed for {host} (problems: {errors})"
            )),
        }
    }
}
