// crates/locality-core/src/loader/builder.rs
#![cfg(feature = "json")]

use super::common_io;
use super::standard::codec;
use crate::error::Result;
#[cfg(not(feature = "compact"))]
use crate::error::LookupError;
use crate::model::{PostalDb, CACHE_SUFFIX};
use bincode::Options;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

#[cfg(feature = "compact")]
use flate2::{write::GzEncoder, Compression};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMode {
    Gzip,
    None,
}

impl CompressionMode {
    /// Gzip when the 'compact' feature is available.
    pub fn preferred() -> Self {
        if cfg!(feature = "compact") {
            CompressionMode::Gzip
        } else {
            CompressionMode::None
        }
    }
}

/// Compiles a source dataset into the binary form the loader prefers.
pub fn build_database(
    source_path: &Path,
    out_path: &Path,
    compression: CompressionMode,
) -> Result<PostalDb> {
    info!(
        source = %source_path.display(),
        out = %out_path.display(),
        ?compression,
        "building postal dataset"
    );
    let db = PostalDb::load_raw_json(source_path)?;
    write_generic(out_path, &db, compression)?;
    Ok(db)
}

impl PostalDb {
    /// **Smart Load:** Uses a fresh cache if present, else builds from source
    /// and writes the cache (best-effort).
    pub(super) fn load_via_builder(path: &Path) -> Result<Self> {
        let cache_path = common_io::get_cache_path(path, CACHE_SUFFIX);

        if common_io::is_cache_fresh(path, &cache_path) {
            match Self::load_binary_file(&cache_path) {
                Ok(db) => return Ok(db),
                Err(e) => debug!(
                    cache = %cache_path.display(),
                    error = %e,
                    "ignoring unreadable cache"
                ),
            }
        }

        let db = Self::load_raw_json(path)?;

        if let Err(e) = write_generic(&cache_path, &db, CompressionMode::preferred()) {
            debug!(cache = %cache_path.display(), error = %e, "could not write dataset cache");
        }
        Ok(db)
    }

    pub fn save_as(&self, path: impl AsRef<Path>) -> Result<()> {
        write_generic(path.as_ref(), self, CompressionMode::preferred())
    }
}

/// Writes any serializable value with the loader's bincode configuration.
fn write_generic<T: serde::Serialize>(
    path: &Path,
    value: &T,
    compression: CompressionMode,
) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    match compression {
        CompressionMode::Gzip => {
            #[cfg(feature = "compact")]
            {
                let mut encoder = GzEncoder::new(writer, Compression::default());
                codec().serialize_into(&mut encoder, value)?;
                encoder.finish()?.flush()?;
            }
            #[cfg(not(feature = "compact"))]
            {
                return Err(LookupError::InvalidData(
                    "Gzip requested but 'compact' disabled".into(),
                ));
            }
        }
        CompressionMode::None => {
            codec().serialize_into(&mut writer, value)?;
            writer.flush()?;
        }
    }
    Ok(())
}
