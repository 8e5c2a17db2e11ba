// crates/locality-core/src/search.rs
//! # Debounced Candidate Search
//!
//! Turns keystrokes in a postal-code field into rate-limited backend
//! queries and publishes the visible candidate list.
//!
//! - Inputs shorter than [`LookupConfig::min_query_chars`] never reach the
//!   backend; they clear the list and supersede anything in flight.
//! - Longer inputs (re)arm a single timer; only the last keystroke of a
//!   burst fires once the quiet period elapses.
//! - Every issued search takes the next sequence number. A response is
//!   applied (and cached) only if its number is still the latest, so a slow
//!   early response can never overwrite a newer list.
//!
//! All methods that spawn must be called from within a tokio runtime.

use crate::cache::QueryCache;
use crate::common::{PostalCodeCandidate, SearchRequest};
use crate::config::LookupConfig;
use crate::text::normalize_query;
use crate::traits::{bounded, LookupBackend};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Coarse state of the candidate dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Searching,
    CandidatesShown,
}

/// What the form renders: the option list and the spinner flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSnapshot {
    pub candidates: Vec<PostalCodeCandidate>,
    pub loading: bool,
}

impl SearchSnapshot {
    pub fn phase(&self) -> SearchPhase {
        if self.loading {
            SearchPhase::Searching
        } else if self.candidates.is_empty() {
            SearchPhase::Idle
        } else {
            SearchPhase::CandidatesShown
        }
    }
}

#[derive(Default)]
struct SearchState {
    cache: QueryCache,
    /// Latest issued search; responses carrying an older number are stale.
    seq: u64,
    /// Latest armed timer; a timer that wakes with an older number is void.
    timer_gen: u64,
    timer: Option<JoinHandle<()>>,
    in_flight: Option<JoinHandle<()>>,
    requests_sent: u64,
    last_error: Option<String>,
}

/// A search that has claimed its sequence number but not yet answered.
struct Ticket {
    seq: u64,
    query: String,
    req: SearchRequest,
}

struct Inner<B> {
    backend: Arc<B>,
    config: LookupConfig,
    state: Mutex<SearchState>,
    snapshot: watch::Sender<SearchSnapshot>,
}

/// Debounced, cached, stale-guarded postal-code search for one form instance.
///
/// Cloning yields another handle to the same instance.
pub struct CandidateSearch<B> {
    inner: Arc<Inner<B>>,
}

impl<B> Clone for CandidateSearch<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: LookupBackend> CandidateSearch<B> {
    pub fn new(backend: Arc<B>, config: LookupConfig) -> Self {
        let (snapshot, _) = watch::channel(SearchSnapshot::default());
        Self {
            inner: Arc::new(Inner {
                backend,
                config,
                state: Mutex::new(SearchState::default()),
                snapshot,
            }),
        }
    }

    pub fn config(&self) -> &LookupConfig {
        &self.inner.config
    }

    /// Keystroke handler for the postal-code field.
    pub fn on_input(&self, raw: &str) {
        let q = normalize_query(raw);
        let mut st = self.lock();

        if q.chars().count() < self.inner.config.min_query_chars {
            Self::disarm(&mut st);
            st.seq += 1;
            if let Some(h) = st.in_flight.take() {
                h.abort();
            }
            self.inner.snapshot.send_replace(SearchSnapshot::default());
            debug!(query = q, "query below threshold; search cleared");
            return;
        }

        Self::disarm(&mut st);
        st.timer_gen += 1;
        let my_gen = st.timer_gen;
        let this = self.clone();
        let q = q.to_owned();
        let delay = self.inner.config.debounce();
        st.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            this.fire(my_gen, q);
        }));
    }

    /// Focus handler: loads the unfiltered first page if nothing is shown yet.
    ///
    /// Returns `true` when a fetch was started.
    pub fn prefetch(&self) -> bool {
        if !self.inner.snapshot.borrow().candidates.is_empty() {
            return false;
        }
        let mut st = self.lock();
        self.spawn_fetch(&mut st, String::new());
        true
    }

    /// Looks up `query` immediately, bypassing the debounce timer.
    ///
    /// Cache hits publish synchronously without touching the backend. Failures
    /// are logged and publish an empty list; nothing is returned to the caller.
    pub async fn fetch(&self, query: &str) {
        let ticket = {
            let mut st = self.lock();
            self.begin(&mut st, normalize_query(query).to_owned())
        };
        if let Some(ticket) = ticket {
            self.complete(ticket).await;
        }
    }

    /// Puts `id`/`label` at the head of the list unless it is already present.
    ///
    /// Edit forms use this so a stored selection has a label to display.
    pub fn upsert_candidate(&self, id: &str, label: &str) {
        if id.is_empty() || label.is_empty() {
            return;
        }
        self.inner.snapshot.send_if_modified(|s| {
            if s.candidates.iter().any(|c| c.id == id) {
                return false;
            }
            s.candidates.insert(0, PostalCodeCandidate::new(id, label));
            true
        });
    }

    /// Back to `Idle`: timer and in-flight search dropped, list emptied.
    /// The cache survives; it belongs to the instance, not to one session of typing.
    pub fn reset(&self) {
        let mut st = self.lock();
        Self::disarm(&mut st);
        st.seq += 1;
        if let Some(h) = st.in_flight.take() {
            h.abort();
        }
        st.last_error = None;
        self.inner.snapshot.send_replace(SearchSnapshot::default());
    }

    /// Waits until no timer is armed and no search is running.
    ///
    /// Meant for drivers that have stopped feeding input (CLI, tests).
    pub async fn wait_idle(&self) {
        loop {
            let next = {
                let mut st = self.lock();
                st.timer.take().or_else(|| st.in_flight.take())
            };
            match next {
                // An aborted task yields a JoinError; that is fine here.
                Some(handle) => {
                    let _ = handle.await;
                }
                None => break,
            }
        }
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    pub fn candidates(&self) -> Vec<PostalCodeCandidate> {
        self.inner.snapshot.borrow().candidates.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.snapshot.borrow().loading
    }

    pub fn phase(&self) -> SearchPhase {
        self.inner.snapshot.borrow().phase()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.inner.snapshot.subscribe()
    }

    /// Message of the most recent failed search, cleared by the next success.
    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    /// Number of searches that actually went to the backend.
    pub fn requests_sent(&self) -> u64 {
        self.lock().requests_sent
    }

    pub fn cached_queries(&self) -> usize {
        self.lock().cache.len()
    }

    // --- Internal Helpers ---

    fn lock(&self) -> MutexGuard<'_, SearchState> {
        // A panic while holding the lock leaves plain data behind; keep going.
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn disarm(st: &mut SearchState) {
        st.timer_gen += 1;
        if let Some(h) = st.timer.take() {
            h.abort();
        }
    }

    fn fire(&self, my_gen: u64, q: String) {
        let mut st = self.lock();
        if st.timer_gen != my_gen {
            return;
        }
        st.timer = None;
        self.spawn_fetch(&mut st, q);
    }

    fn spawn_fetch(&self, st: &mut SearchState, q: String) {
        let Some(ticket) = self.begin(st, q) else {
            return;
        };
        let this = self.clone();
        // The previous search keeps running detached; the sequence check voids it.
        st.in_flight = Some(tokio::spawn(async move { this.complete(ticket).await }));
    }

    /// Takes the next sequence number and either serves the cache or raises
    /// the loading flag. Runs under the state lock, so a short input or reset
    /// that comes later always sees and clears what this published.
    fn begin(&self, st: &mut SearchState, q: String) -> Option<Ticket> {
        st.seq += 1;
        if let Some(hit) = st.cache.get(&q) {
            let candidates = hit.to_vec();
            debug!(query = %q, hits = candidates.len(), "candidate cache hit");
            self.inner.snapshot.send_replace(SearchSnapshot {
                candidates,
                loading: false,
            });
            return None;
        }
        st.requests_sent += 1;
        self.inner.snapshot.send_modify(|s| s.loading = true);
        debug!(query = %q, seq = st.seq, "searching postal codes");
        Some(Ticket {
            seq: st.seq,
            req: self.inner.config.search_request(&q),
            query: q,
        })
    }

    /// Awaits the backend and publishes the answer if it is still the latest.
    async fn complete(&self, ticket: Ticket) {
        let Ticket { seq, query, req } = ticket;
        let res = bounded(
            self.inner.config.request_timeout(),
            self.inner.backend.search_postal_codes(req),
        )
        .await;

        let mut st = self.lock();
        if st.seq != seq {
            debug!(query = %query, seq, latest = st.seq, "dropping stale search response");
            return;
        }
        match res {
            Ok(candidates) => {
                st.cache.insert(query, candidates.clone());
                st.last_error = None;
                self.inner.snapshot.send_replace(SearchSnapshot {
                    candidates,
                    loading: false,
                });
            }
            Err(e) => {
                warn!(query = %query, error = %e, "postal code search failed");
                st.last_error = Some(e.to_string());
                self.inner.snapshot.send_replace(SearchSnapshot::default());
            }
        }
    }
}
