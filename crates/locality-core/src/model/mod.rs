// crates/locality-core/src/model/mod.rs
pub mod convert;
pub mod flat;
pub mod search;

pub use flat::{City, PostalCode, PostalDb, State};

/// Suffix of the bincode cache written next to a JSON source dataset.
#[cfg(not(feature = "compact"))]
pub const CACHE_SUFFIX: &str = "flat.bin";
#[cfg(feature = "compact")]
pub const CACHE_SUFFIX: &str = "comp.flat.bin";
