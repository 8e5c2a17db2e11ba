// Shared fixtures for the integration tests.
#![allow(dead_code)]

use locality_core::{
    LookupBackend, LookupConfig, LookupError, PostalCodeCandidate, ResolvedLocality, Result,
    SearchRequest,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// In-memory backend with scripted answers, delays and failures.
///
/// Every call is recorded before the reply is produced, so a request that
/// is later aborted still shows up in the log.
#[derive(Default)]
pub struct ScriptedBackend {
    state: Mutex<Script>,
}

#[derive(Default)]
struct Script {
    searches: Vec<SearchRequest>,
    locality_requests: Vec<String>,
    candidates: HashMap<String, Vec<PostalCodeCandidate>>,
    localities: HashMap<String, ResolvedLocality>,
    failing_searches: HashSet<String>,
    failing_localities: HashSet<String>,
    hanging_localities: HashSet<String>,
    search_delays: HashMap<String, Duration>,
    locality_delays: HashMap<String, Duration>,
}

impl ScriptedBackend {
    /// The fixture most tests start from: two Springfield codes and one in Chicago.
    pub fn springfield() -> Self {
        let b = Self::default();
        b.with_candidates("550", &[("z1", "55001"), ("z2", "55002")]);
        b.with_candidates("5500", &[("z1", "55001"), ("z2", "55002")]);
        b.with_candidates("55001", &[("z1", "55001")]);
        b.with_candidates("606", &[("z60601", "60601")]);
        b.with_candidates("", &[("z1", "55001"), ("z2", "55002"), ("z60601", "60601")]);
        b.with_locality("z1", "c9", "Springfield", "s2", "IL");
        b.with_locality("z2", "c9", "Springfield", "s2", "IL");
        b.with_locality("z60601", "c10", "Chicago", "s2", "IL");
        b
    }

    pub fn with_candidates(&self, query: &str, hits: &[(&str, &str)]) -> &Self {
        let list = hits
            .iter()
            .map(|(id, label)| PostalCodeCandidate::new(*id, *label))
            .collect();
        self.lock().candidates.insert(query.to_owned(), list);
        self
    }

    pub fn with_locality(
        &self,
        id: &str,
        city_id: &str,
        city: &str,
        state_id: &str,
        state: &str,
    ) -> &Self {
        self.lock().localities.insert(
            id.to_owned(),
            ResolvedLocality {
                city_id: city_id.into(),
                city_name: city.into(),
                state_id: state_id.into(),
                state_name: state.into(),
            },
        );
        self
    }

    pub fn fail_search(&self, query: &str) -> &Self {
        self.lock().failing_searches.insert(query.to_owned());
        self
    }

    pub fn fail_locality(&self, id: &str) -> &Self {
        self.lock().failing_localities.insert(id.to_owned());
        self
    }

    /// The locality call for `id` never completes.
    pub fn hang_locality(&self, id: &str) -> &Self {
        self.lock().hanging_localities.insert(id.to_owned());
        self
    }

    pub fn delay_search(&self, query: &str, ms: u64) -> &Self {
        self.lock()
            .search_delays
            .insert(query.to_owned(), Duration::from_millis(ms));
        self
    }

    pub fn delay_locality(&self, id: &str, ms: u64) -> &Self {
        self.lock()
            .locality_delays
            .insert(id.to_owned(), Duration::from_millis(ms));
        self
    }

    /// Queries that reached the backend, in call order.
    pub fn searches(&self) -> Vec<String> {
        self.lock().searches.iter().map(|r| r.query.clone()).collect()
    }

    pub fn search_requests(&self) -> Vec<SearchRequest> {
        self.lock().searches.clone()
    }

    pub fn locality_requests(&self) -> Vec<String> {
        self.lock().locality_requests.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.state.lock().unwrap()
    }
}

impl LookupBackend for ScriptedBackend {
    async fn search_postal_codes(&self, req: SearchRequest) -> Result<Vec<PostalCodeCandidate>> {
        let (delay, reply) = {
            let mut s = self.lock();
            s.searches.push(req.clone());
            let reply = if s.failing_searches.contains(&req.query) {
                Err(LookupError::Status { code: 500 })
            } else {
                Ok(s.candidates.get(&req.query).cloned().unwrap_or_default())
            };
            (s.search_delays.get(&req.query).copied(), reply)
        };
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }
        reply
    }

    async fn resolve_locality(&self, postal_code_id: &str) -> Result<Option<ResolvedLocality>> {
        let (delay, hang, reply) = {
            let mut s = self.lock();
            s.locality_requests.push(postal_code_id.to_owned());
            let reply = if s.failing_localities.contains(postal_code_id) {
                Err(LookupError::Status { code: 500 })
            } else {
                Ok(s.localities.get(postal_code_id).cloned())
            };
            (
                s.locality_delays.get(postal_code_id).copied(),
                s.hanging_localities.contains(postal_code_id),
                reply,
            )
        };
        if hang {
            std::future::pending::<()>().await;
        }
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }
        reply
    }
}

/// Default thresholds with a short timeout so hanging calls end quickly.
pub fn config() -> LookupConfig {
    LookupConfig::default().with_timeout(Some(Duration::from_secs(2)))
}

pub fn labels(c: &[PostalCodeCandidate]) -> Vec<&str> {
    c.iter().map(|c| c.label.as_str()).collect()
}

/// Lets spawned tasks run without moving the paused clock.
pub async fn yield_a_bit() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

pub async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
