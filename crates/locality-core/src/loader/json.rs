// crates/locality-core/src/loader/json.rs

// ---------------------------------------------------------------------------
// FILE GUARD: This entire file is skipped if 'json' feature is missing.
// ---------------------------------------------------------------------------
#![cfg(feature = "json")]

use super::common_io;
use crate::error::Result;
use crate::model::convert::{from_raw, StateRaw};
use crate::model::PostalDb;
use std::path::Path;

impl PostalDb {
    /// Parses a source dataset held in memory.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let raw: Vec<StateRaw> = serde_json::from_str(s)?;
        Ok(from_raw(raw))
    }

    /// Parses a source `.json` / `.json.gz` file, skipping any cache.
    pub fn load_raw_json(path: impl AsRef<Path>) -> Result<Self> {
        let reader = common_io::open_stream(path.as_ref())?;
        let raw: Vec<StateRaw> = serde_json::from_reader(reader)?;
        Ok(from_raw(raw))
    }
}
