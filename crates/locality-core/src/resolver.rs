// crates/locality-core/src/resolver.rs
//! # Dependent Locality Resolver
//!
//! Fills city and state once a postal code is picked. At most one
//! resolution is outstanding per form: starting another cancels the
//! previous one through its [`CancellationToken`] and aborts its task.
//!
//! Cancellation is cooperative, so an aborted call may already have
//! finished remotely. A generation number checked under the resolver lock
//! keeps such a late result from ever reaching the draft.

use crate::common::ResolvedLocality;
use crate::error::{LookupError, Result};
use crate::form::AddressDraft;
use crate::traits::{bounded, LookupBackend};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LocalityPhase {
    #[default]
    NoLocality,
    Resolving(String),
    Resolved,
}

#[derive(Default)]
struct ResolverState {
    generation: u64,
    token: Option<CancellationToken>,
    task: Option<JoinHandle<()>>,
    requests_sent: u64,
    last_error: Option<String>,
}

struct Inner<B> {
    backend: Arc<B>,
    timeout: Option<Duration>,
    draft: Arc<watch::Sender<AddressDraft>>,
    state: Mutex<ResolverState>,
    phase: watch::Sender<LocalityPhase>,
}

pub struct LocalityResolver<B> {
    inner: Arc<Inner<B>>,
}

impl<B> Clone for LocalityResolver<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: LookupBackend> LocalityResolver<B> {
    /// `draft` is the form's shared draft; resolved localities are written into it.
    pub fn new(
        backend: Arc<B>,
        draft: Arc<watch::Sender<AddressDraft>>,
        timeout: Option<Duration>,
    ) -> Self {
        let (phase, _) = watch::channel(LocalityPhase::NoLocality);
        Self {
            inner: Arc::new(Inner {
                backend,
                timeout,
                draft,
                state: Mutex::new(ResolverState::default()),
                phase,
            }),
        }
    }

    /// Starts resolving `postal_code_id`, superseding any earlier request.
    ///
    /// A blank id is a no-op and returns `false`. Must be called from
    /// within a tokio runtime.
    pub fn resolve(&self, postal_code_id: &str) -> bool {
        let id = postal_code_id.trim();
        if id.is_empty() {
            return false;
        }

        let mut st = self.lock();
        Self::cancel_locked(&mut st);
        st.requests_sent += 1;
        let my_gen = st.generation;
        let token = CancellationToken::new();
        st.token = Some(token.clone());

        self.inner
            .phase
            .send_replace(LocalityPhase::Resolving(id.to_owned()));
        debug!(postal_code_id = id, generation = my_gen, "resolving locality");

        let this = self.clone();
        let id = id.to_owned();
        st.task = Some(tokio::spawn(async move {
            let outcome = tokio::select! {
                biased;
                _ = token.cancelled() => Err(LookupError::Cancelled),
                res = bounded(this.inner.timeout, this.inner.backend.resolve_locality(&id)) => res,
            };
            this.finish(my_gen, &id, outcome);
        }));
        true
    }

    /// Aborts the outstanding request, if any, and forgets the resolved
    /// state. A cancelled result will never be applied.
    pub fn cancel(&self) {
        let mut st = self.lock();
        Self::cancel_locked(&mut st);
        self.inner.phase.send_if_modified(|p| {
            let changed = *p != LocalityPhase::NoLocality;
            *p = LocalityPhase::NoLocality;
            changed
        });
    }

    /// Forgets the resolved state without touching the draft.
    pub(crate) fn reset(&self) {
        let mut st = self.lock();
        Self::cancel_locked(&mut st);
        st.last_error = None;
        self.inner.phase.send_replace(LocalityPhase::NoLocality);
    }

    /// Waits for the outstanding request (if any) to finish or die.
    pub async fn wait_idle(&self) {
        loop {
            let next = self.lock().task.take();
            match next {
                Some(handle) => {
                    let _ = handle.await;
                }
                None => break,
            }
        }
    }

    pub fn phase(&self) -> LocalityPhase {
        self.inner.phase.borrow().clone()
    }

    pub fn is_resolving(&self) -> bool {
        matches!(*self.inner.phase.borrow(), LocalityPhase::Resolving(_))
    }

    pub fn subscribe(&self) -> watch::Receiver<LocalityPhase> {
        self.inner.phase.subscribe()
    }

    /// Message of the most recent failed resolution, cleared by the next success.
    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    pub fn requests_sent(&self) -> u64 {
        self.lock().requests_sent
    }

    // --- Internal Helpers ---

    fn lock(&self) -> MutexGuard<'_, ResolverState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn cancel_locked(st: &mut ResolverState) {
        st.generation += 1;
        if let Some(token) = st.token.take() {
            token.cancel();
        }
        if let Some(task) = st.task.take() {
            task.abort();
        }
    }

    fn finish(
        &self,
        my_gen: u64,
        id: &str,
        outcome: Result<Option<ResolvedLocality>>,
    ) {
        let mut st = self.lock();
        if st.generation != my_gen {
            debug!(postal_code_id = id, "locality response superseded; dropped");
            return;
        }
        st.token = None;
        st.task = None;

        let failure = match outcome {
            Ok(Some(loc)) if !loc.is_empty() => {
                let applied = self.inner.draft.send_if_modified(|d| {
                    if d.postal_code_id() != Some(id) {
                        return false;
                    }
                    d.apply_locality(&loc);
                    true
                });
                if applied {
                    st.last_error = None;
                    self.inner.phase.send_replace(LocalityPhase::Resolved);
                    debug!(
                        postal_code_id = id,
                        city = %loc.city_name,
                        state = %loc.state_name,
                        "locality resolved"
                    );
                } else {
                    self.inner.phase.send_replace(LocalityPhase::NoLocality);
                }
                return;
            }
            Ok(_) => LookupError::NotFound(format!("no locality for postal code {id}")),
            Err(e) if e.is_cancellation() => {
                debug!(postal_code_id = id, "locality request cancelled");
                return;
            }
            Err(e) => e,
        };

        warn!(postal_code_id = id, error = %failure, "locality resolution failed");
        st.last_error = Some(failure.to_string());
        self.inner.draft.send_if_modified(|d| {
            if d.postal_code_id() != Some(id) {
                return false;
            }
            d.clear_locality();
            true
        });
        self.inner.phase.send_replace(LocalityPhase::NoLocality);
    }
}
