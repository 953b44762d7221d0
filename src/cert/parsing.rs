//! Internal parsing helpers.

use crate::cert::error::CertificateError;
use crate::cert::Certificate;
use crate::spiffe_id::SPIFFE_SCHEME_PREFIX;
use crate::SpiffeId;
use x509_parser::certificate::X509Certificate;
use x509_parser::der_parser::oid::Oid;
use x509_parser::error::X509Error;
use x509_parser::extensions::ParsedExtension;
use x509_parser::nom::Err;
use x509_parser::oid_registry;
use x509_parser::prelude::GeneralName;

const MAX_URI_SAN_ENTRIES: usize = 32;
const MAX_URI_LENGTH: usize = 2048;

/// Maximum number of certificates allowed in a certificate chain.
///
/// A SPIFFE X.509-SVID chain usually holds 1-3 certificates.
pub(crate) const MAX_CERT_CHAIN_LENGTH: usize = 16;

/// Splits concatenated DER-encoded certificates into a `Vec<Certificate>`.
///
/// `limit` bounds the number of certificates for chains; bundles pass `None`
/// since they may legitimately hold many authorities.
pub(crate) fn split_concatenated_der(
    der: &[u8],
    limit: Option<usize>,
) -> Result<Vec<Certificate>, CertificateError> {
    let mut rest = der;
    let mut certs = Vec::new();

    while !rest.is_empty() {
        if let Some(max) = limit {
            if certs.len() >= max {
                return Err(CertificateError::TooManyCertificates { max });
            }
        }

        let (new_rest, _cert) = x509_parser::parse_x509_certificate(rest).map_err(map_nom_err)?;

        let cert_len = rest.len() - new_rest.len();
        certs.push(Certificate(rest[..cert_len].to_vec()));

        rest = new_rest;
    }

    Ok(certs)
}

/// Parses the given DER-encoded bytes as an X.509 certificate.
pub(crate) fn parse_der_encoded_bytes_as_x509_certificate(
    der_bytes: &[u8],
) -> Result<X509Certificate<'_>, CertificateError> {
    x509_parser::parse_x509_certificate(der_bytes)
        .map(|(_, cert)| cert)
        .map_err(map_nom_err)
}

fn map_nom_err(e: Err<X509Error>) -> CertificateError {
    match e {
        Err::Incomplete(_) => CertificateError::ParseX509Certificate(X509Error::InvalidCertificate),
        Err::Error(err) | Err::Failure(err) => CertificateError::ParseX509Certificate(err),
    }
}

/// Returns the parsed X.509 extension for the provided OID.
///
/// # Errors
/// - [`CertificateError::MissingX509Extension`] if the extension is not present.
/// - [`CertificateError::ParseX509Certificate`] if the extension is duplicated.
pub(crate) fn get_x509_extension<'a>(
    cert: &'a X509Certificate<'_>,
    oid: &Oid<'static>,
) -> Result<&'a ParsedExtension<'a>, CertificateError> {
    match cert.tbs_certificate.get_extension_unique(oid)? {
        None => Err(CertificateError::MissingX509Extension(oid.clone())),
        Some(ext) => Ok(ext.parsed_extension()),
    }
}

/// Collects every `spiffe://` URI SAN of `cert` as a [`SpiffeId`].
///
/// Non-SPIFFE URIs and oversized URIs are skipped; a malformed `spiffe://` URI is an error.
pub(crate) fn extract_spiffe_ids_from_uri_san(
    cert: &X509Certificate<'_>,
) -> Result<Vec<SpiffeId>, CertificateError> {
    let ext = get_x509_extension(cert, &oid_registry::OID_X509_EXT_SUBJECT_ALT_NAME)?;

    let san = match ext {
        ParsedExtension::SubjectAlternativeName(s) => s,
        other => return Err(CertificateError::UnexpectedExtension(format!("{other:?}"))),
    };

    let mut ids = Vec::new();
    let uris = san.general_names.iter().filter_map(|name| match name {
        GeneralName::URI(u) => Some(*u),
        _ => None,
    });

    for (count, uri) in uris.enumerate() {
        if count >= MAX_URI_SAN_ENTRIES {
            return Err(CertificateError::TooManyUriSanEntries {
                max: MAX_URI_SAN_ENTRIES,
            });
        }

        if uri.len() > MAX_URI_LENGTH || !uri.starts_with(SPIFFE_SCHEME_PREFIX) {
            continue;
        }

        ids.push(SpiffeId::new(uri)?);
    }

    Ok(ids)
}
