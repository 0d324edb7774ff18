//! Server certificate trust decisions.
//!
//! A [`TrustEvaluator`] sees what went wrong with a certificate (as
//! [`PolicyErrors`]) plus a per-element description of the chain, and
//! decides whether the handshake may continue. [`EvaluatingVerifier`]
//! plugs an evaluator into rustls.

mod evaluator;
mod verifier;

pub use evaluator::{
    BypassTrustEvaluator, CHAIN_DIAGNOSTIC_HEADER, ChainElement, PolicyErrors,
    StrictTrustEvaluator, TrustDecision, TrustEvaluator,
};
pub use verifier::{EvaluatingVerifier, client_config};
