// crates/locality-core/src/config.rs
//! # Lookup Configuration
//!
//! Tunables shared by the search and resolver halves of the helper. The
//! defaults reproduce the portal forms: three characters before a search,
//! 300ms of quiet before a request, pages of twenty candidates.
use crate::common::SearchRequest;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MIN_QUERY_CHARS: usize = 3;
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LookupConfig {
    /// Trimmed queries shorter than this never reach the backend.
    pub min_query_chars: usize,
    /// Quiet period after the last keystroke before a search fires.
    pub debounce_ms: u64,
    pub page_offset: u32,
    pub page_size: u32,
    /// Restricts candidate searches to one country when set.
    pub country_id: Option<String>,
    /// Upper bound for each backend call. `None` waits forever.
    pub request_timeout_ms: Option<u64>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            min_query_chars: DEFAULT_MIN_QUERY_CHARS,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            page_offset: 0,
            page_size: DEFAULT_PAGE_SIZE,
            country_id: None,
            request_timeout_ms: Some(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}

impl LookupConfig {
    #[cfg(feature = "json")]
    pub fn load_from_path(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            crate::LookupError::NotFound(format!("Config not found at {}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn with_min_query_chars(mut self, n: usize) -> Self {
        self.min_query_chars = n;
        self
    }

    pub fn with_debounce(mut self, d: Duration) -> Self {
        self.debounce_ms = d.as_millis() as u64;
        self
    }

    pub fn with_page(mut self, offset: u32, size: u32) -> Self {
        self.page_offset = offset;
        self.page_size = size;
        self
    }

    pub fn with_country(mut self, country_id: impl Into<String>) -> Self {
        self.country_id = Some(country_id.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout_ms = timeout.map(|d| d.as_millis() as u64);
        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Builds the search payload for an already trimmed query.
    pub fn search_request(&self, query: &str) -> SearchRequest {
        SearchRequest {
            query: query.to_owned(),
            page_offset: self.page_offset,
            page_size: self.page_size,
            country_id: self.country_id.clone(),
        }
    }
}
