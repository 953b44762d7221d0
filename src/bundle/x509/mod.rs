//! X.509 bundle types.

use crate::bundle::BundleSource;
use crate::cert::error::CertificateError;
use crate::cert::parsing::split_concatenated_der;
use crate::cert::Certificate;
use crate::spiffe_id::TrustDomain;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

/// This type contains a collection of trusted X.509 authorities for a [`TrustDomain`].
///
/// Authorities are deduplicated; their order carries no meaning, also not for equality.
#[derive(Debug, Clone)]
pub struct X509Bundle {
    trust_domain: TrustDomain,
    x509_authorities: Vec<Certificate>,
}

/// This type contains a set of [`X509Bundle`], keyed by [`TrustDomain`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct X509BundleSet {
    bundles: HashMap<TrustDomain, Arc<X509Bundle>>,
}

/// An error that can arise trying to parse a [`X509Bundle`] from bytes
/// representing DER-encoded X.509 authorities.
#[derive(Debug, thiserror::Error, PartialEq)]
#[non_exhaustive]
pub enum X509BundleError {
    /// Error processing or validating the X.509 certificates in the bundle.
    #[error(transparent)]
    Certificate(#[from] CertificateError),
}

impl X509Bundle {
    /// Creates an empty `X509Bundle` for the given [`TrustDomain`].
    pub fn new(trust_domain: TrustDomain) -> Self {
        Self {
            trust_domain,
            x509_authorities: Vec::new(),
        }
    }

    /// Creates a bundle from a list of DER-encoded X.509 authorities.
    ///
    /// # Errors
    ///
    /// If the function cannot parse the inputs, a [`X509BundleError`] variant will be returned.
    pub fn from_x509_authorities(
        trust_domain: TrustDomain,
        authorities: &[&[u8]],
    ) -> Result<Self, X509BundleError> {
        let mut bundle = Self::new(trust_domain);
        for authority in authorities {
            bundle.add_authority(authority)?;
        }
        Ok(bundle)
    }

    /// Parses a bundle from ASN.1 DER-encoded data representing a concatenated list of certificates.
    ///
    /// # Errors
    ///
    /// If the function cannot parse the inputs, a [`X509BundleError`] variant will be returned.
    pub fn parse_from_der(
        trust_domain: TrustDomain,
        bundle_der: &[u8],
    ) -> Result<Self, X509BundleError> {
        let mut bundle = Self::new(trust_domain);
        for certificate in split_concatenated_der(bundle_der, None)? {
            bundle.insert(certificate);
        }
        Ok(bundle)
    }

    /// Adds an X.509 authority as ASN.1 DER-encoded data (binary format) to the bundle.
    /// Adding an authority that is already in the bundle has no effect.
    ///
    /// # Errors
    ///
    /// If `authority_bytes` is not a DER-encoded X.509 certificate, a [`X509BundleError`]
    /// variant will be returned.
    pub fn add_authority(&mut self, authority_bytes: &[u8]) -> Result<(), X509BundleError> {
        let certificate = Certificate::try_from(authority_bytes)?;
        self.insert(certificate);
        Ok(())
    }

    /// Removes the given X.509 authority from the bundle.
    ///
    /// Returns `true` if the authority was present.
    pub fn remove_authority(&mut self, authority_bytes: &[u8]) -> bool {
        let before = self.x509_authorities.len();
        self.x509_authorities
            .retain(|c| c.as_bytes() != authority_bytes);
        self.x509_authorities.len() != before
    }

    /// Returns `true` if the bundle contains the given X.509 authority.
    pub fn has_authority(&self, authority_bytes: &[u8]) -> bool {
        self.x509_authorities
            .iter()
            .any(|c| c.as_bytes() == authority_bytes)
    }

    /// Returns the [`TrustDomain`] associated with the bundle.
    pub fn trust_domain(&self) -> &TrustDomain {
        &self.trust_domain
    }

    /// Returns the X.509 authorities in the bundle.
    pub fn authorities(&self) -> &[Certificate] {
        &self.x509_authorities
    }

    fn insert(&mut self, certificate: Certificate) {
        if !self.x509_authorities.contains(&certificate) {
            self.x509_authorities.push(certificate);
        }
    }
}

impl PartialEq for X509Bundle {
    fn eq(&self, other: &Self) -> bool {
        // authorities are deduplicated on insertion
        self.trust_domain == other.trust_domain
            && self.x509_authorities.len() == other.x509_authorities.len()
            && self
                .x509_authorities
                .iter()
                .all(|c| other.x509_authorities.contains(c))
    }
}

impl Eq for X509Bundle {}

/// A single bundle is a source that only knows about its own trust domain.
impl BundleSource for X509Bundle {
    type Item = X509Bundle;
    type Error = Infallible;

    fn bundle_for_trust_domain(
        &self,
        trust_domain: &TrustDomain,
    ) -> Result<Option<Arc<Self::Item>>, Self::Error> {
        if &self.trust_domain == trust_domain {
            Ok(Some(Arc::new(self.clone())))
        } else {
            Ok(None)
        }
    }
}

impl X509BundleSet {
    /// Creates a new empty `X509BundleSet`.
    pub fn new() -> Self {
        Self {
            bundles: HashMap::new(),
        }
    }

    /// Adds a new [`X509Bundle`] into the set. If a bundle already exists for the
    /// trust domain, the existing bundle is replaced.
    pub fn add_bundle(&mut self, bundle: X509Bundle) {
        let trust_domain = bundle.trust_domain().clone();
        self.bundles.insert(trust_domain, Arc::new(bundle));
    }

    /// Returns the [`X509Bundle`] associated with the given [`TrustDomain`].
    pub fn get_bundle(&self, trust_domain: &TrustDomain) -> Option<&Arc<X509Bundle>> {
        self.bundles.get(trust_domain)
    }

    /// Returns the number of bundles in the set.
    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    /// Returns `true` if the set holds no bundle.
    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}

impl Default for X509BundleSet {
    fn default() -> Self {
        Self::new()
    }
}

impl BundleSource for X509BundleSet {
    type Item = X509Bundle;
    type Error = Infallible;

    fn bundle_for_trust_domain(
        &self,
        trust_domain: &TrustDomain,
    ) -> Result<Option<Arc<Self::Item>>, Self::Error> {
        Ok(self.bundles.get(trust_domain).cloned())
    }
}

impl FromIterator<X509Bundle> for X509BundleSet {
    fn from_iter<I: IntoIterator<Item = X509Bundle>>(iter: I) -> Self {
        let mut set = Self::new();
        for bundle in iter {
            set.add_bundle(bundle);
        }
        set
    }
}
