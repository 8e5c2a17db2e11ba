// crates/locality-core/src/common.rs
//! Shared wire types used by every backend and by the form state.
use serde::{Deserialize, Deserializer, Serialize};

/// One selectable postal-code search result.
///
/// The portal's dropdown endpoint returns option objects shaped
/// `{ value, label }`; other producers use `{ id, label }`. Both decode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostalCodeCandidate {
    #[serde(alias = "value")]
    pub id: String,
    pub label: String,
}

impl PostalCodeCandidate {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// City and state derived from a postal code.
///
/// Always replaced as a whole; there is no partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLocality {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub city_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub city_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub state_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub state_name: String,
}

// The backend sends `null` for names it could not resolve.
fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

impl ResolvedLocality {
    /// A locality with neither a city nor a state name is treated as unresolvable.
    pub fn is_empty(&self) -> bool {
        self.city_name.trim().is_empty() && self.state_name.trim().is_empty()
    }
}

/// Outgoing payload of the candidate search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(rename = "searchString")]
    pub query: String,
    #[serde(rename = "pageIndex")]
    pub page_offset: u32,
    #[serde(rename = "pageSize")]
    pub page_size: u32,
    #[serde(rename = "countryId", default, skip_serializing_if = "Option::is_none")]
    pub country_id: Option<String>,
}

/// Simple aggregate statistics for a loaded postal dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbStats {
    pub postal_codes: usize,
    pub cities: usize,
    pub states: usize,
    pub countries: usize,
}
