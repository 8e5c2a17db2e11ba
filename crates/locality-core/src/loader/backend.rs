// crates/locality-core/src/loader/backend.rs
use crate::common::{PostalCodeCandidate, ResolvedLocality, SearchRequest};
use crate::error::Result;
use crate::model::PostalDb;
use crate::traits::LookupBackend;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Offline backend answering both lookups from an in-memory [`PostalDb`].
///
/// An optional artificial latency makes the debounce and cancellation
/// behavior observable from the CLI.
#[derive(Debug, Clone)]
pub struct DatasetBackend {
    db: Arc<PostalDb>,
    latency: Option<Duration>,
}

impl DatasetBackend {
    pub fn new(db: PostalDb) -> Self {
        Self {
            db: Arc::new(db),
            latency: None,
        }
    }

    #[cfg(feature = "json")]
    pub fn bundled() -> Result<Self> {
        Ok(Self::new(PostalDb::load_bundled()?))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(PostalDb::load_from_path(path)?))
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn db(&self) -> &PostalDb {
        &self.db
    }

    async fn delay(&self) {
        if let Some(d) = self.latency {
            tokio::time::sleep(d).await;
        }
    }
}

impl LookupBackend for DatasetBackend {
    async fn search_postal_codes(&self, req: SearchRequest) -> Result<Vec<PostalCodeCandidate>> {
        self.delay().await;
        Ok(self.db.search(&req))
    }

    async fn resolve_locality(&self, postal_code_id: &str) -> Result<Option<ResolvedLocality>> {
        self.delay().await;
        Ok(self.db.locality(postal_code_id))
    }
}
