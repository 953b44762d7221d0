//! Ordered structural checks of a leaf-first certificate chain.
//!
//! Path building in `webpki` treats the presented intermediates as an unordered pool, so the
//! ordering requirements of an X.509-SVID chain are enforced here first.

use crate::cert::error::CertificateError;
use crate::cert::parsing::get_x509_extension;
use crate::cert::Certificate;
use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::ParsedExtension;
use x509_parser::oid_registry;

/// Why a chain is structurally unfit. Only ever logged, never returned to callers.
#[derive(Debug, thiserror::Error)]
pub(super) enum ChainStructureError {
    #[error("certificate at position {0} cannot be parsed")]
    Unparseable(usize, #[source] CertificateError),

    #[error("certificate at position {0} is not a CA")]
    SigningCertificateMissingCaFlag(usize),

    #[error("certificate at position {0} lacks the 'keyCertSign' key usage")]
    SigningCertificateMissingKeyCertSign(usize),

    #[error("certificate at position {0} has an unparseable {1} extension")]
    UnparseableExtension(usize, &'static str),

    #[error("issuer of certificate at position {0} is not the subject of the next certificate")]
    IssuerMismatch(usize),
}

/// Checks that every certificate after the leaf is a signing certificate and that each
/// certificate was issued by the one following it.
pub(super) fn validate_chain_structure(chain: &[Certificate]) -> Result<(), ChainStructureError> {
    let parsed = chain
        .iter()
        .enumerate()
        .map(|(pos, c)| c.parse().map_err(|e| ChainStructureError::Unparseable(pos, e)))
        .collect::<Result<Vec<_>, _>>()?;

    for (pos, pair) in parsed.windows(2).enumerate() {
        let (subject, issuer) = (&pair[0], &pair[1]);
        if subject.issuer().as_raw() != issuer.subject().as_raw() {
            return Err(ChainStructureError::IssuerMismatch(pos));
        }
        validate_signing_certificate(pos + 1, issuer)?;
    }

    Ok(())
}

fn validate_signing_certificate(
    pos: usize,
    cert: &X509Certificate<'_>,
) -> Result<(), ChainStructureError> {
    let basic_constraints = oid_registry::OID_X509_EXT_BASIC_CONSTRAINTS;
    let key_usage = oid_registry::OID_X509_EXT_KEY_USAGE;
    let extension = |oid| {
        get_x509_extension(cert, oid).map_err(|e| ChainStructureError::Unparseable(pos, e))
    };

    match extension(&basic_constraints)? {
        ParsedExtension::BasicConstraints(b) if b.ca => {}
        ParsedExtension::BasicConstraints(_) => {
            return Err(ChainStructureError::SigningCertificateMissingCaFlag(pos));
        }
        // Extension OID is present but content could not be parsed.
        _ => {
            return Err(ChainStructureError::UnparseableExtension(
                pos,
                "BasicConstraints",
            ));
        }
    }

    match extension(&key_usage)? {
        ParsedExtension::KeyUsage(k) if k.key_cert_sign() => Ok(()),
        ParsedExtension::KeyUsage(_) => {
            Err(ChainStructureError::SigningCertificateMissingKeyCertSign(pos))
        }
        _ => Err(ChainStructureError::UnparseableExtension(pos, "KeyUsage")),
    }
}
