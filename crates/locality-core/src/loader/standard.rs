// crates/locality-core/src/loader/standard.rs
use super::common_io;
use crate::error::Result;
use crate::model::PostalDb;
use bincode::Options;
use std::io::Read;
use std::path::Path;

/// Upper bound for a decoded dataset; caps what a corrupt length prefix can allocate.
const MAX_DATASET_BYTES: u64 = 256 * 1024 * 1024;

/// The single bincode configuration used for both reading and writing.
pub(crate) fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_limit(MAX_DATASET_BYTES)
        .allow_trailing_bytes()
}

impl PostalDb {
    /// Reconstructs the dataset from its compiled binary form.
    ///
    /// A file that decodes but carries dangling indices is rejected with
    /// [`LookupError::InvalidData`](crate::LookupError::InvalidData).
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let db: Self = codec().deserialize(data)?;
        db.check_indices()?;
        Ok(db)
    }

    /// **Standard Loader:** Loads a compiled (optionally gzipped) `.bin`.
    pub(crate) fn load_binary_file(path: &Path) -> Result<Self> {
        let mut stream = common_io::open_stream(path)?;
        let mut data = Vec::new();
        stream.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }
}
