// crates/locality-core/src/loader/common_io.rs
use crate::error::{LookupError, Result};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

#[cfg(feature = "compact")]
use flate2::read::GzDecoder;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Opens a dataset file and transparently un-gzips it.
///
/// Compression is detected from the gzip magic bytes, not from the file
/// name, so `.bin` caches and `.json.gz` sources go through the same path.
pub fn open_stream(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).map_err(|e| {
        LookupError::NotFound(format!("Dataset not found at {}: {}", path.display(), e))
    })?;

    let mut reader = BufReader::new(file);
    let gzipped = reader.fill_buf()?.starts_with(&GZIP_MAGIC);

    if !gzipped {
        return Ok(Box::new(reader));
    }

    #[cfg(feature = "compact")]
    {
        Ok(Box::new(GzDecoder::new(reader)))
    }

    #[cfg(not(feature = "compact"))]
    {
        Err(LookupError::InvalidData(format!(
            "{} is gzip-compressed but the 'compact' feature is disabled",
            path.display()
        )))
    }
}

/// `data/postal_codes.json` -> `data/postal_codes.json.<suffix>`
pub fn get_cache_path(source: &Path, suffix: &str) -> PathBuf {
    let filename = source
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.with_file_name(format!("{filename}.{suffix}"))
}

/// A cache is fresh when it exists and is not older than its source.
pub fn is_cache_fresh(source: &Path, cache: &Path) -> bool {
    let cache_time = match fs::metadata(cache).and_then(|m| m.modified()) {
        Ok(t) => t,
        Err(_) => return false,
    };
    match fs::metadata(source).and_then(|m| m.modified()) {
        Ok(source_time) => source_time <= cache_time,
        Err(_) => true,
    }
}
