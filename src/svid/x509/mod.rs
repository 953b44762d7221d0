//! X.509-SVID validation.
//!
//! [`verify_chain`] authenticates a peer: its chain must be anchored in the bundle of the
//! trust domain named by the leaf's SPIFFE ID. [`verify_spiffe_id`] authorizes it: the leaf's
//! SPIFFE ID must be one of the accepted ones. Both are stateless and may be called
//! concurrently.
//!
//! Absent inputs are modelled as `None` and rejected with
//! [`X509SvidValidationError::InvalidArgument`] before any other work is done.

mod validations;

use crate::bundle::BundleSource;
use crate::cert::error::CertificateError;
use crate::cert::parsing::MAX_CERT_CHAIN_LENGTH;
use crate::cert::Certificate;
use crate::prelude::{debug, warn};
use crate::svid::x509::validations::validate_chain_structure;
use crate::svid::AcceptedSpiffeIds;
use crate::{SpiffeId, TrustDomain, X509Bundle};
use std::error::Error;
use std::time::{SystemTime, UNIX_EPOCH};
use webpki::types::{CertificateDer, TrustAnchor, UnixTime};
use webpki::{EndEntityCert, KeyUsage, VerifiedPath};

/// An error that may arise validating an X.509-SVID.
///
/// Every variant means the peer must be rejected; they only differ in what they tell the
/// operator.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum X509SvidValidationError {
    /// A required argument was absent.
    #[error("required argument `{0}` is missing")]
    InvalidArgument(&'static str),

    /// The SPIFFE ID could not be extracted from the certificate.
    #[error("failed extracting SPIFFE ID from X.509 certificate")]
    CertificateParsing(#[from] CertificateError),

    /// No bundle is known for the trust domain of the leaf SPIFFE ID.
    #[error("no X.509 bundle found for trust domain {0}")]
    BundleNotFound(TrustDomain),

    /// The bundle source failed to look up the bundle.
    #[error("failed fetching X.509 bundle from bundle source")]
    BundleSource(#[source] Box<dyn Error + Send + Sync>),

    /// The chain is not anchored in the trust bundle.
    ///
    /// Deliberately carries no detail on which certificate or check failed.
    #[error("certificate chain cannot be verified")]
    ChainVerificationFailed,

    /// The SPIFFE ID is well formed but not one of the accepted SPIFFE IDs.
    #[error("SPIFFE ID {0} in X.509 certificate is not accepted")]
    IdentityNotAccepted(SpiffeId),

    /// The accepted SPIFFE IDs could not be obtained.
    #[error("failed obtaining the accepted SPIFFE IDs")]
    AcceptedSpiffeIds(#[source] Box<dyn Error + Send + Sync>),
}

/// Verifies that `chain` is anchored in the X.509 bundle of the leaf's trust domain,
/// as of now.
///
/// `chain` is leaf-first and may omit the root. Every certificate after the leaf must be a
/// CA that issued the certificate before it, and the last one must be issued by (or be) an
/// authority of the bundle that `bundle_source` returns for the leaf's trust domain.
/// Authorities of other trust domains are never considered.
///
/// # Errors
///
/// - [`X509SvidValidationError::InvalidArgument`] if `chain` is `None` or empty, or if
///   `bundle_source` is `None`.
/// - [`X509SvidValidationError::CertificateParsing`] if the leaf has no valid SPIFFE ID.
/// - [`X509SvidValidationError::BundleNotFound`] if there is no bundle for the leaf's trust
///   domain.
/// - [`X509SvidValidationError::BundleSource`] if the bundle source fails.
/// - [`X509SvidValidationError::ChainVerificationFailed`] for any path validation failure,
///   including an empty bundle.
pub fn verify_chain<S>(
    chain: Option<&[Certificate]>,
    bundle_source: Option<&S>,
) -> Result<(), X509SvidValidationError>
where
    S: BundleSource<Item = X509Bundle> + ?Sized,
{
    verify_chain_at(chain, bundle_source, SystemTime::now())
}

/// Same as [`verify_chain`], with certificate validity periods evaluated at `time`.
///
/// # Errors
///
/// See [`verify_chain`].
pub fn verify_chain_at<S>(
    chain: Option<&[Certificate]>,
    bundle_source: Option<&S>,
    time: SystemTime,
) -> Result<(), X509SvidValidationError>
where
    S: BundleSource<Item = X509Bundle> + ?Sized,
{
    let chain = chain
        .filter(|c| !c.is_empty())
        .ok_or(X509SvidValidationError::InvalidArgument("chain"))?;
    let bundle_source =
        bundle_source.ok_or(X509SvidValidationError::InvalidArgument("bundle_source"))?;

    let leaf = &chain[0];
    let spiffe_id = leaf.spiffe_id()?;
    let trust_domain = spiffe_id.trust_domain();

    let bundle = bundle_source
        .bundle_for_trust_domain(trust_domain)
        .map_err(|e| X509SvidValidationError::BundleSource(Box::new(e)))?
        .ok_or_else(|| {
            debug!("No X.509 bundle for trust domain {}", trust_domain);
            X509SvidValidationError::BundleNotFound(trust_domain.clone())
        })?;

    verify_path(chain, &bundle, time).map_err(|reason| {
        debug!(
            "Certificate chain of {} cannot be verified: {}",
            spiffe_id, reason
        );
        X509SvidValidationError::ChainVerificationFailed
    })
}

/// Verifies that the SPIFFE ID of `cert` is one of the IDs returned by `accepted_ids`.
///
/// Matching is exact: both trust domain and path must be equal, there is no wildcard or
/// prefix matching. `accepted_ids` is invoked once, after the SPIFFE ID has been extracted.
///
/// # Errors
///
/// - [`X509SvidValidationError::InvalidArgument`] if `cert` or `accepted_ids` is `None`.
/// - [`X509SvidValidationError::CertificateParsing`] if `cert` has no valid SPIFFE ID.
/// - [`X509SvidValidationError::AcceptedSpiffeIds`] if `accepted_ids` fails.
/// - [`X509SvidValidationError::IdentityNotAccepted`] if the SPIFFE ID is not accepted.
pub fn verify_spiffe_id<A>(
    cert: Option<&Certificate>,
    accepted_ids: Option<&A>,
) -> Result<(), X509SvidValidationError>
where
    A: AcceptedSpiffeIds + ?Sized,
{
    let cert = cert.ok_or(X509SvidValidationError::InvalidArgument("cert"))?;
    let accepted_ids =
        accepted_ids.ok_or(X509SvidValidationError::InvalidArgument("accepted_spiffe_ids"))?;

    let spiffe_id = cert.spiffe_id()?;

    let accepted = accepted_ids
        .accepted_spiffe_ids()
        .map_err(|e| X509SvidValidationError::AcceptedSpiffeIds(Box::new(e)))?;

    if accepted.contains(&spiffe_id) {
        Ok(())
    } else {
        debug!("SPIFFE ID {} is not accepted", spiffe_id);
        Err(X509SvidValidationError::IdentityNotAccepted(spiffe_id))
    }
}

/// Runs path validation of `chain` against the authorities of `bundle` only.
///
/// The returned reason is for logging; callers map it to a generic error.
fn verify_path(
    chain: &[Certificate],
    bundle: &X509Bundle,
    time: SystemTime,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    if chain.len() > MAX_CERT_CHAIN_LENGTH {
        return Err(format!("chain longer than {MAX_CERT_CHAIN_LENGTH} certificates").into());
    }

    let anchors = trust_anchors(bundle);
    if anchors.is_empty() {
        return Err(format!("bundle for {} has no usable authority", bundle.trust_domain()).into());
    }

    validate_chain_structure(chain)?;

    let time = UnixTime::since_unix_epoch(time.duration_since(UNIX_EPOCH)?);

    let leaf = CertificateDer::from(chain[0].as_bytes());
    let intermediates = chain[1..]
        .iter()
        .map(|c| CertificateDer::from(c.as_bytes()))
        .collect::<Vec<_>>();

    let leaf = EndEntityCert::try_from(&leaf).map_err(|e| format!("leaf: {e:?}"))?;

    // webpki draws intermediates from an unordered pool and stops at the first anchor, so
    // only accept a path that is exactly the presented chain.
    let presented_path = |path: &VerifiedPath<'_>| {
        if is_presented_chain(path, &intermediates) {
            Ok(())
        } else {
            Err(webpki::Error::UnknownIssuer)
        }
    };

    let verify = |usage| {
        leaf.verify_for_usage(
            webpki::ALL_VERIFICATION_ALGS,
            &anchors,
            &intermediates,
            time,
            usage,
            None,
            Some(&presented_path),
        )
        .map(|_| ())
    };

    // An SVID may be presented by either side of a connection.
    match verify(KeyUsage::client_auth()) {
        Err(webpki::Error::RequiredEkuNotFound) => verify(KeyUsage::server_auth()),
        other => other,
    }
    .map_err(|e| format!("{e:?}").into())
}

/// Whether `path` goes through every presented intermediate in order, each one signed by the
/// next. A trailing certificate that is not part of the path must be the anchor itself.
fn is_presented_chain(path: &VerifiedPath<'_>, presented: &[CertificateDer<'_>]) -> bool {
    let used = path
        .intermediate_certificates()
        .map(|cert| cert.der())
        .collect::<Vec<_>>();

    let Some((in_path, rest)) = presented.split_at_checked(used.len()) else {
        return false;
    };
    let same_certs = in_path
        .iter()
        .zip(&used)
        .all(|(presented, used)| presented[..] == used[..]);

    match rest {
        [] => same_certs,
        [root] => same_certs && is_anchor(root, path.anchor()),
        _ => false,
    }
}

fn is_anchor(cert: &CertificateDer<'_>, anchor: &TrustAnchor<'_>) -> bool {
    webpki::anchor_from_trusted_cert(cert).is_ok_and(|candidate| {
        candidate.subject[..] == anchor.subject[..]
            && candidate.subject_public_key_info[..] == anchor.subject_public_key_info[..]
    })
}

fn trust_anchors(bundle: &X509Bundle) -> Vec<TrustAnchor<'static>> {
    bundle
        .authorities()
        .iter()
        .filter_map(|authority| {
            let der = CertificateDer::from(authority.as_bytes());
            match webpki::anchor_from_trusted_cert(&der) {
                Ok(anchor) => Some(anchor.to_owned()),
                Err(e) => {
                    warn!(
                        "Skipping X.509 authority of {} unusable as trust anchor: {:?}",
                        bundle.trust_domain(),
                        e
                    );
                    None
                }
            }
        })
        .collect()
}
