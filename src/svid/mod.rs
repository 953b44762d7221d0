//! Validation of SPIFFE Verifiable Identity Documents (SVIDs).

use crate::SpiffeId;
use std::convert::Infallible;
use std::error::Error;

pub mod x509;

/// Supplies the SPIFFE IDs a validator currently accepts.
///
/// It is queried lazily, exactly once per validation, and its answer is never cached, so
/// implementations are free to change the accepted set over time.
///
/// Closures returning a `Vec<SpiffeId>` implement this trait. Boxed or shared suppliers are
/// passed to the validators as trait objects, e.g. `&*arc` for an
/// `Arc<dyn AcceptedSpiffeIds<Error = E>>`.
pub trait AcceptedSpiffeIds {
    /// The error type returned when the accepted set cannot be obtained.
    type Error: Error + Send + Sync + 'static;

    /// Returns the currently accepted SPIFFE IDs. Order is irrelevant.
    ///
    /// # Errors
    ///
    /// Returns `Err(Self::Error)` if the accepted set cannot be obtained.
    fn accepted_spiffe_ids(&self) -> Result<Vec<SpiffeId>, Self::Error>;
}

// ---- ergonomic blanket impl (closures / function pointers) ----

impl<F> AcceptedSpiffeIds for F
where
    F: Fn() -> Vec<SpiffeId>,
{
    type Error = Infallible;

    fn accepted_spiffe_ids(&self) -> Result<Vec<SpiffeId>, Self::Error> {
        Ok(self())
    }
}
