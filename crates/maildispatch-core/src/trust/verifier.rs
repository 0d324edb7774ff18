//! rustls adapter consulting a [`TrustEvaluator`] during the handshake.

use super::{ChainElement, PolicyErrors, TrustEvaluator};
use maildispatch_smtp::connection::crypto_provider;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, verify_tls12_signature, verify_tls13_signature};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::server::ParsedCertificate;
use rustls::{CertificateError, ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use std::sync::Arc;
use tracing::{debug, warn};

/// Certificate verifier that runs the webpki checks, then lets a
/// [`TrustEvaluator`] make the final call.
///
/// The trust anchor and host name checks run separately so the evaluator
/// sees every problem at once.
#[derive(Debug)]
pub struct EvaluatingVerifier {
    evaluator: Arc<dyn TrustEvaluator>,
    roots: Arc<RootCertStore>,
    provider: Arc<CryptoProvider>,
}

impl EvaluatingVerifier {
    /// Creates a verifier trusting the bundled webpki roots.
    #[must_use]
    pub fn new(evaluator: Arc<dyn TrustEvaluator>) -> Self {
        let roots = RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        };
        Self::with_roots(evaluator, roots)
    }

    /// Creates a verifier trusting only `roots`.
    #[must_use]
    pub fn with_roots(evaluator: Arc<dyn TrustEvaluator>, roots: RootCertStore) -> Self {
        Self {
            evaluator,
            roots: Arc::new(roots),
            provider: crypto_provider(),
        }
    }
}

impl ServerCertVerifier for EvaluatingVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        let host = server_name.to_str();
        let mut errors = PolicyErrors::NONE;
        let mut first_error = None;
        let mut chain_error = None;

        match ParsedCertificate::try_from(end_entity) {
            Ok(cert) => {
                if let Err(err) = rustls::client::verify_server_cert_signed_by_trust_anchor(
                    &cert,
                    &self.roots,
                    intermediates,
                    now,
                    self.provider.signature_verification_algorithms.all,
                ) {
                    errors |= PolicyErrors::CHAIN_ERRORS;
                    chain_error = Some(err.to_string());
                    first_error.get_or_insert(err);
                }
                if let Err(err) = rustls::client::verify_server_name(&cert, server_name) {
                    errors |= PolicyErrors::NAME_MISMATCH;
                    first_error.get_or_insert(err);
                }
            }
            Err(err) => {
                errors |= PolicyErrors::CERTIFICATE_UNAVAILABLE;
                first_error = Some(err);
            }
        }

        let chain = describe_chain(end_entity, intermediates, now, chain_error);
        let decision = self.evaluator.evaluate(&host, errors, &chain);

        if let Some(diagnostic) = &decision.diagnostic {
            warn!(
                host = %host,
                %errors,
                accepted = decision.accepted,
                "Server certificate: {diagnostic}"
            );
        }

        if decision.accepted {
            debug!(host = %host, "Server certificate accepted");
            Ok(ServerCertVerified::assertion())
        } else {
            Err(first_error.unwrap_or(rustls::Error::InvalidCertificate(
                CertificateError::ApplicationVerificationFailure,
            )))
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

/// Builds a TLS client configuration whose certificate checks are decided
/// by `evaluator`.
///
/// # Errors
///
/// Returns an error if the crypto provider rejects the default protocol
/// versions.
pub fn client_config(
    evaluator: Arc<dyn TrustEvaluator>,
) -> Result<Arc<ClientConfig>, rustls::Error> {
    let verifier = EvaluatingVerifier::new(evaluator);
    let config = ClientConfig::builder_with_provider(crypto_provider())
        .with_safe_default_protocol_versions()?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(verifier))
        .with_no_client_auth();
    Ok(Arc::new(config))
}

/// Describes each presented certificate, leaf first.
///
/// Validity windows are checked per element; the webpki chain error, if
/// any, is reported on the leaf.
fn describe_chain(
    end_entity: &CertificateDer<'_>,
    intermediates: &[CertificateDer<'_>],
    now: UnixTime,
    chain_error: Option<String>,
) -> Vec<ChainElement> {
    let now = i64::try_from(now.as_secs()).unwrap_or(i64::MAX);

    let mut chain: Vec<ChainElement> = std::iter::once(end_entity)
        .chain(intermediates)
        .map(|der| describe(der, now))
        .collect();

    if let (Some(leaf), Some(err)) = (chain.first_mut(), chain_error) {
        leaf.statuses.push(err);
    }
    chain
}

fn describe(der: &CertificateDer<'_>, now: i64) -> ChainElement {
    let Ok((_, cert)) = x509_parser::parse_x509_certificate(der.as_ref()) else {
        return ChainElement::new("<unparseable certificate>").with_status("cannot be parsed");
    };

    let mut element = ChainElement::new(cert.subject().to_string());
    let validity = cert.validity();
    if now > validity.not_after.timestamp() {
        element.statuses.push("certificate has expired".into());
    }
    if now < validity.not_before.timestamp() {
        element.statuses.push("certificate is not yet valid".into());
    }
    element
}
