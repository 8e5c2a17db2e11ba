// crates/locality-core/src/cache.rs
use crate::common::PostalCodeCandidate;
use std::collections::HashMap;

/// Per-form memo of candidate lists keyed by the trimmed query.
///
/// Unbounded; it lives exactly as long as the owning form instance. The
/// empty key holds the focus prefetch.
#[derive(Debug, Default, Clone)]
pub struct QueryCache {
    entries: HashMap<String, Vec<PostalCodeCandidate>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, query: &str) -> Option<&[PostalCodeCandidate]> {
        self.entries.get(query).map(Vec::as_slice)
    }

    pub fn contains(&self, query: &str) -> bool {
        self.entries.contains_key(query)
    }

    pub fn insert(&mut self, query: impl Into<String>, candidates: Vec<PostalCodeCandidate>) {
        self.entries.insert(query.into(), candidates);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
