//! `Certificate` type and helpers.
//!
//! A [`Certificate`] wraps DER-encoded bytes that are validated at construction time.

use crate::cert::error::CertificateError;
use crate::cert::parsing::{
    extract_spiffe_ids_from_uri_san, parse_der_encoded_bytes_as_x509_certificate,
    split_concatenated_der, MAX_CERT_CHAIN_LENGTH,
};
use crate::SpiffeId;
use x509_parser::certificate::X509Certificate;

pub mod error;
pub(crate) mod parsing;

/// A single DER-encoded X.509 certificate.
///
/// Invariant: instances are always validated as parseable DER-encoded X.509.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Certificate(Vec<u8>);

impl Certificate {
    /// Returns the certificate bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Extracts the SPIFFE ID from the certificate's URI SAN.
    ///
    /// This requires the certificate to contain **exactly one** URI SAN that parses
    /// as a SPIFFE ID. URI SANs with a scheme other than `spiffe` are ignored.
    ///
    /// # Errors
    /// - [`CertificateError::MissingX509Extension`] if the certificate has no SAN extension.
    /// - [`CertificateError::MissingSpiffeId`] if no SPIFFE ID is present in the URI SAN.
    /// - [`CertificateError::MultipleSpiffeIds`] if multiple SPIFFE IDs are present.
    /// - [`CertificateError::InvalidSpiffeId`] if a `spiffe://` URI SAN is malformed.
    /// - [`CertificateError::TooManyUriSanEntries`] if the certificate has more than 32 URI SAN entries.
    pub fn spiffe_id(&self) -> Result<SpiffeId, CertificateError> {
        let x509 = self.parse()?;
        extract_single_spiffe_id_from_uri_san(&x509)
    }

    pub(crate) fn parse(&self) -> Result<X509Certificate<'_>, CertificateError> {
        parse_der_encoded_bytes_as_x509_certificate(&self.0)
    }
}

impl AsRef<[u8]> for Certificate {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Certificate {
    type Error = CertificateError;

    fn try_from(der_bytes: &[u8]) -> Result<Self, Self::Error> {
        parse_der_encoded_bytes_as_x509_certificate(der_bytes)?;
        Ok(Self(Vec::from(der_bytes)))
    }
}

impl TryFrom<Vec<u8>> for Certificate {
    type Error = CertificateError;

    fn try_from(der_bytes: Vec<u8>) -> Result<Self, Self::Error> {
        parse_der_encoded_bytes_as_x509_certificate(&der_bytes)?;
        Ok(Self(der_bytes))
    }
}

/// Parses a leaf-first certificate chain from concatenated DER-encoded certificates.
///
/// # Errors
/// - [`CertificateError::TooManyCertificates`] if the input holds more than 16 certificates.
/// - [`CertificateError::ParseX509Certificate`] if any certificate cannot be parsed.
pub fn parse_chain_from_der(cert_chain_der: &[u8]) -> Result<Vec<Certificate>, CertificateError> {
    split_concatenated_der(cert_chain_der, Some(MAX_CERT_CHAIN_LENGTH))
}

/// Extracts a SPIFFE ID from a DER-encoded X.509 certificate.
///
/// Same rules as [`Certificate::spiffe_id`].
///
/// # Errors
///
/// See [`Certificate::spiffe_id`].
pub fn spiffe_id_from_der(der: &[u8]) -> Result<SpiffeId, CertificateError> {
    let x509 = parse_der_encoded_bytes_as_x509_certificate(der)?;
    extract_single_spiffe_id_from_uri_san(&x509)
}

pub(crate) fn extract_single_spiffe_id_from_uri_san(
    cert: &X509Certificate<'_>,
) -> Result<SpiffeId, CertificateError> {
    let mut ids = extract_spiffe_ids_from_uri_san(cert)?.into_iter();

    let Some(first) = ids.next() else {
        return Err(CertificateError::MissingSpiffeId);
    };
    if ids.next().is_some() {
        return Err(CertificateError::MultipleSpiffeIds);
    }

    Ok(first)
}
