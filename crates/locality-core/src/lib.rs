// crates/locality-core/src/lib.rs

//! Postal code autocomplete with dependent city/state resolution.
//!
//! [`AddressAutocomplete`] ties a debounced, cached [`CandidateSearch`] to a
//! cancellable [`LocalityResolver`] that writes into a shared
//! [`AddressDraft`]. Any [`LookupBackend`] can serve the lookups: the REST
//! [`HttpBackend`] (feature `http`) or an in-memory [`DatasetBackend`].

pub mod autocomplete;
pub mod cache;
pub mod client;
pub mod common;
pub mod config;
pub mod error;
pub mod form;
pub mod loader; // Dataset I/O and the offline backend
pub mod model;
pub mod resolver;
pub mod search; // Debounced candidate search
pub mod session;
pub mod text;
pub mod traits;

// Re-exports
pub use crate::autocomplete::AddressAutocomplete;
pub use crate::common::{DbStats, PostalCodeCandidate, ResolvedLocality, SearchRequest};
pub use crate::config::LookupConfig;
pub use crate::error::{LookupError, Result};
pub use crate::form::{AddressDraft, AddressField, AddressSubmission, FieldErrors, StoredAddress};
pub use crate::loader::DatasetBackend;
pub use crate::model::{City, PostalCode, PostalDb, State};
pub use crate::resolver::{LocalityPhase, LocalityResolver};
pub use crate::search::{CandidateSearch, SearchPhase, SearchSnapshot};
pub use crate::session::{LoginResponse, Role, Session, SessionStore, UserProfile};
pub use crate::traits::LookupBackend;

#[cfg(feature = "json")]
pub use crate::loader::builder::{build_database, CompressionMode};
#[cfg(feature = "http")]
pub use crate::client::{HttpBackend, HttpConfig};
