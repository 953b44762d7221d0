//! X.509 bundle types and the [`BundleSource`] capability.

use crate::spiffe_id::TrustDomain;
use std::error::Error;
use std::sync::Arc;

pub mod x509;

/// Represents a source of bundles queryable by [`TrustDomain`].
///
/// Implementations may be backed by static configuration, a remote service or a
/// hot-reloadable store. Validators call it synchronously, once per validation, and
/// keep no reference to the returned bundle beyond that call.
pub trait BundleSource {
    /// The bundle type provided by the source.
    type Item: Send + Sync + 'static;

    /// The error type returned by the source.
    type Error: Error + Send + Sync + 'static;

    /// Returns the bundle associated with the given [`TrustDomain`].
    ///
    /// If no bundle is associated with the trust domain, returns `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `Err(Self::Error)` if the bundle cannot be retrieved from the underlying source.
    fn bundle_for_trust_domain(
        &self,
        trust_domain: &TrustDomain,
    ) -> Result<Option<Arc<Self::Item>>, Self::Error>;
}

impl<T> BundleSource for Arc<T>
where
    T: BundleSource + ?Sized,
{
    type Item = T::Item;
    type Error = T::Error;

    fn bundle_for_trust_domain(
        &self,
        trust_domain: &TrustDomain,
    ) -> Result<Option<Arc<Self::Item>>, Self::Error> {
        (**self).bundle_for_trust_domain(trust_domain)
    }
}
