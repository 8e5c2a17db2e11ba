// crates/locality-core/src/autocomplete.rs
//! # Address Auto-Resolution Helper
//!
//! One instance per address form. It owns the form's [`AddressDraft`], a
//! [`CandidateSearch`] for the postal-code dropdown and a
//! [`LocalityResolver`] for the dependent city/state fields, and wires the
//! UI events of the postal-code field to them.
//!
//! ```no_run
//! use locality_core::{AddressAutocomplete, DatasetBackend, LookupConfig};
//! use std::sync::Arc;
//!
//! # async fn demo() -> locality_core::Result<()> {
//! let backend = Arc::new(DatasetBackend::bundled()?);
//! let form = AddressAutocomplete::new(backend, LookupConfig::default());
//!
//! form.on_input("627");
//! form.settle().await;
//! if let Some(first) = form.candidates().first() {
//!     form.select(&first.id, &first.label);
//! }
//! form.settle().await;
//! println!("{} {}", form.draft().city(), form.draft().state());
//! # Ok(())
//! # }
//! ```

use crate::common::PostalCodeCandidate;
use crate::config::LookupConfig;
use crate::form::{AddressDraft, FieldErrors};
use crate::resolver::{LocalityPhase, LocalityResolver};
use crate::search::{CandidateSearch, SearchPhase};
use crate::traits::LookupBackend;
use std::sync::Arc;
use tokio::sync::watch;

pub struct AddressAutocomplete<B> {
    search: CandidateSearch<B>,
    resolver: LocalityResolver<B>,
    draft: Arc<watch::Sender<AddressDraft>>,
    country_id: Option<String>,
}

impl<B: LookupBackend> AddressAutocomplete<B> {
    pub fn new(backend: Arc<B>, config: LookupConfig) -> Self {
        let country_id = config.country_id.clone();
        let timeout = config.request_timeout();
        let (draft, _) = watch::channel(AddressDraft::new(country_id.clone()));
        let draft = Arc::new(draft);
        Self {
            resolver: LocalityResolver::new(Arc::clone(&backend), Arc::clone(&draft), timeout),
            search: CandidateSearch::new(backend, config),
            draft,
            country_id,
        }
    }

    /// Loads an existing address (edit mode).
    ///
    /// The stored postal code is seeded into the option list so it has a
    /// label, and a missing city or state is resolved from it. Must be
    /// called from within a tokio runtime when resolution is needed.
    pub fn with_draft(self, draft: AddressDraft) -> Self {
        self.resolver.reset();
        if let Some(id) = draft.postal_code_id() {
            self.search.upsert_candidate(id, draft.postal_code());
        }
        let pending = draft
            .needs_resolution()
            .then(|| draft.postal_code_id().map(str::to_owned))
            .flatten();
        self.draft.send_replace(draft);
        if let Some(id) = pending {
            self.resolver.resolve(&id);
        }
        self
    }

    /// Keystrokes in the postal-code field.
    pub fn on_input(&self, raw: &str) {
        self.search.on_input(raw);
    }

    /// Focus on the postal-code field; prefetches when the list is empty.
    pub fn on_focus(&self) -> bool {
        self.search.prefetch()
    }

    /// A candidate was picked. City and state are blanked at once and
    /// re-filled when the resolver answers. A blank id behaves like [`clear`](Self::clear).
    pub fn select(&self, id: &str, label: &str) {
        let id = id.trim();
        if id.is_empty() {
            self.clear();
            return;
        }
        self.resolver.cancel();
        self.draft.send_modify(|d| d.select_postal_code(id, label));
        self.resolver.resolve(id);
    }

    /// Selects by candidate from the current list.
    pub fn select_candidate(&self, candidate: &PostalCodeCandidate) {
        self.select(&candidate.id, &candidate.label);
    }

    /// The clear action: postal code, city and state go together, no request.
    pub fn clear(&self) {
        self.resolver.cancel();
        self.draft.send_modify(AddressDraft::clear_postal_code);
    }

    /// Both state machines back to their initial state and a fresh draft.
    pub fn reset(&self) {
        self.search.reset();
        self.resolver.reset();
        self.draft
            .send_replace(AddressDraft::new(self.country_id.clone()));
    }

    /// The free-text street lines; the only user-typed part of the address.
    pub fn set_address_lines(&self, address1: &str, address2: &str) {
        self.draft.send_modify(|d| {
            d.set_address1(address1);
            d.set_address2(address2);
        });
    }

    /// Waits until no search timer, search or resolution is outstanding.
    pub async fn settle(&self) {
        self.search.wait_idle().await;
        self.resolver.wait_idle().await;
    }

    pub fn draft(&self) -> AddressDraft {
        self.draft.borrow().clone()
    }

    pub fn subscribe_draft(&self) -> watch::Receiver<AddressDraft> {
        self.draft.subscribe()
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        self.draft.borrow().validate()
    }

    pub fn candidates(&self) -> Vec<PostalCodeCandidate> {
        self.search.candidates()
    }

    pub fn is_loading(&self) -> bool {
        self.search.is_loading()
    }

    pub fn search_phase(&self) -> SearchPhase {
        self.search.phase()
    }

    pub fn locality_phase(&self) -> LocalityPhase {
        self.resolver.phase()
    }

    pub fn search(&self) -> &CandidateSearch<B> {
        &self.search
    }

    pub fn resolver(&self) -> &LocalityResolver<B> {
        &self.resolver
    }
}
