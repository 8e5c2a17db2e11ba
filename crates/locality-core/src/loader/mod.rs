// crates/locality-core/src/loader/mod.rs

//! # Data Loader
//!
//! Handles the Physical Layer (I/O, Decompression) and delegates to
//! specific parsers (Binary vs JSON). Also hosts [`DatasetBackend`], which
//! serves both lookups from a loaded dataset.

use crate::error::Result;
#[cfg(not(feature = "json"))]
use crate::error::LookupError;
use crate::model::PostalDb;
use std::path::{Path, PathBuf};

mod backend;
pub mod builder;
mod common_io;
mod json;
mod standard;

pub use backend::DatasetBackend;

#[cfg(feature = "json")]
static BUNDLED_DB: once_cell::sync::OnceCell<PostalDb> = once_cell::sync::OnceCell::new();

#[cfg(feature = "json")]
const BUNDLED_JSON: &str = include_str!("../../data/postal_codes.json");

impl PostalDb {
    pub fn default_data_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
    }

    pub fn default_dataset_filename() -> &'static str {
        "postal_codes.json"
    }

    /// The sample dataset compiled into the crate, parsed once per process.
    #[cfg(feature = "json")]
    pub fn load_bundled() -> Result<Self> {
        BUNDLED_DB
            .get_or_try_init(|| Self::from_json_str(BUNDLED_JSON))
            .cloned()
    }

    /// Loads a dataset, picking the parser from the file name:
    /// `*.bin` is a compiled dataset, anything else is source JSON
    /// (plain or gzipped) that gets a bincode cache written next to it.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if is_binary(path) {
            return Self::load_binary_file(path);
        }

        #[cfg(feature = "json")]
        {
            Self::load_via_builder(path)
        }

        #[cfg(not(feature = "json"))]
        {
            Err(LookupError::InvalidData(format!(
                "{} looks like JSON but the 'json' feature is disabled",
                path.display()
            )))
        }
    }
}

fn is_binary(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("bin"))
}
