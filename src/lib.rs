//! Workspace crate: re-exports `locality-core` so the demos can be run from
//! the repository root with `cargo run --example <name>`.
pub use locality_core::*;
