//! locality-cli
//! ============
//!
//! Command-line interface for the `locality-core` postal code lookup.
//!
//! This crate primarily provides a binary (`locality-cli`). The small
//! library target exists so that the documentation page shows this overview.
//!
//! Basic usage:
//!
//! ```text
//! locality-cli --help
//! locality-cli stats
//! locality-cli search 600
//! locality-cli resolve p600017
//! locality-cli fill 6 60 600 --pick 2 --street "4 Beach Rd"
//! locality-cli --endpoint https://portal.example.com/api --token $TOKEN search 600
//! locality-cli build my_codes.json.gz my_codes.bin
//! ```
//!
//! For programmatic access (the debounced form helper, the resolver and the
//! backends), use the `locality-core` crate directly.
#![cfg_attr(docsrs, feature(doc_cfg))]

// This library target intentionally exposes no API; the binary is the primary
// deliverable.
