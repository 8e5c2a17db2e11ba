// crates/locality-core/src/text.rs
use deunicode::deunicode;

/// Accent-insensitive, case-insensitive key for name matching.
///
/// `"São Paulo"` and `"sao paulo"` fold to the same key.
pub fn fold_key(s: &str) -> String {
    deunicode(s.trim()).to_ascii_lowercase()
}

/// Cache and request key for a raw search input.
///
/// Only surrounding whitespace is removed; case is kept as typed.
pub fn normalize_query(raw: &str) -> &str {
    raw.trim()
}
