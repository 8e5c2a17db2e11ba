// crates/locality-core/src/traits.rs
use crate::common::{PostalCodeCandidate, ResolvedLocality, SearchRequest};
use crate::error::{LookupError, Result};
use std::future::Future;
use std::time::Duration;

/// The two remote calls the autocomplete helper depends on.
///
/// Implementations are black boxes: the portal's REST endpoints
/// ([`crate::client::HttpBackend`]), an in-memory dataset
/// ([`crate::loader::DatasetBackend`]), or a scripted fake in tests.
///
/// Dropping a returned future must abandon the request; that is how the
/// resolver aborts superseded calls. Implementors must be
/// `Send + Sync + 'static` because calls run on spawned tasks.
pub trait LookupBackend: Send + Sync + 'static {
    /// Candidate postal codes matching `req.query`, in display order.
    fn search_postal_codes(
        &self,
        req: SearchRequest,
    ) -> impl Future<Output = Result<Vec<PostalCodeCandidate>>> + Send;

    /// City and state for a postal-code id. `Ok(None)` means the backend
    /// answered but could not resolve the id.
    fn resolve_locality(
        &self,
        postal_code_id: &str,
    ) -> impl Future<Output = Result<Option<ResolvedLocality>>> + Send;
}

/// Runs `fut` with an optional upper bound; expiry becomes [`LookupError::Timeout`].
pub(crate) async fn bounded<T>(
    limit: Option<Duration>,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match limit {
        Some(after) => tokio::time::timeout(after, fut)
            .await
            .map_err(|_| LookupError::Timeout { after })?,
        None => fut.await,
    }
}
