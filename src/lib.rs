#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

//! This crate validates [SPIFFE X.509-SVIDs](https://github.com/spiffe/spiffe/blob/main/standards/X509-SVID.md)
//! presented by a peer.
//!
//! Validation is split in two independent, stateless steps:
//!
//! - [`verify_chain`] checks that a leaf-first certificate chain is anchored in the
//!   [`X509Bundle`] of the trust domain named by the leaf's SPIFFE ID.
//! - [`verify_spiffe_id`] checks that the SPIFFE ID of a certificate belongs to a set of
//!   accepted SPIFFE IDs.
//!
//! # Examples
//!
//! ```no_run
//! use spiffe_svid_validator::cert::Certificate;
//! use spiffe_svid_validator::{
//!     verify_chain, verify_spiffe_id, SpiffeId, TrustDomain, X509Bundle, X509BundleSet,
//! };
//!
//! # fn example(chain: Vec<Certificate>, root_der: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
//! let trust_domain = TrustDomain::new("example.org")?;
//! let bundle = X509Bundle::from_x509_authorities(trust_domain, &[root_der])?;
//!
//! let mut bundles = X509BundleSet::new();
//! bundles.add_bundle(bundle);
//!
//! // the chain must be anchored in the bundle of the leaf's trust domain
//! verify_chain(Some(chain.as_slice()), Some(&bundles))?;
//!
//! // and the leaf SPIFFE ID must be one of the accepted ones
//! let accepted = || vec![SpiffeId::new("spiffe://example.org/frontend").unwrap()];
//! verify_spiffe_id(chain.first(), Some(&accepted))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **`logging`** (default): emit debug records through the `log` crate.
//! - **`tracing`**: emit events through `tracing` instead.

pub(crate) mod observability;
pub(crate) mod prelude;

pub mod bundle;
pub mod cert;
pub mod spiffe_id;
pub mod svid;

// -----------------------
// Re-exports
// -----------------------

/// Core SPIFFE types and validation functions re-exported for simplified access.
pub use crate::{
    bundle::x509::{X509Bundle, X509BundleError, X509BundleSet},
    bundle::BundleSource,
    cert::error::CertificateError,
    spiffe_id::{SpiffeId, SpiffeIdError, TrustDomain},
    svid::x509::{verify_chain, verify_chain_at, verify_spiffe_id, X509SvidValidationError},
    svid::AcceptedSpiffeIds,
};
