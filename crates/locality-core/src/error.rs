// crates/locality-core/src/error.rs
use std::time::Duration;
use thiserror::Error;

/// Errors produced by lookups, dataset loading and configuration.
///
/// Inside the autocomplete helper none of these reach the caller: failures
/// are logged and turned into empty candidate lists or cleared locality
/// fields. They surface directly only from the backends, the loader and the
/// config layer.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "json")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),

    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered, but its envelope carried a non-200 status code.
    #[error("backend returned status {code}")]
    Status { code: u16 },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("request timed out after {after:?}")]
    Timeout { after: Duration },

    /// The request was aborted because a newer one superseded it.
    #[error("request cancelled")]
    Cancelled,
}

impl LookupError {
    /// Cancellation is an expected outcome, never a fault.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, LookupError::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, LookupError>;
