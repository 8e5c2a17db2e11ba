// crates/locality-core/src/model/convert.rs
use crate::model::flat::{City, PostalCode, PostalDb, State};
use serde::Deserialize;
use tracing::warn;

/// Raw postal code as it comes from the source JSON.
#[derive(Debug, Deserialize)]
pub struct PostalCodeRaw {
    pub id: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityRaw {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub postal_codes: Vec<PostalCodeRaw>,
}

/// Raw state / region structure from JSON:
/// `{ "id", "name", "countryId", "cities": [ { "id", "name", "postalCodes": [...] } ] }`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRaw {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub country_id: Option<String>,
    #[serde(default)]
    pub cities: Vec<CityRaw>,
}

/// **Standard Converter:** Raw tree -> Flat arrays.
///
/// Postal codes with a blank id or code are skipped; they could never be
/// selected or resolved.
pub fn from_raw(raw_states: Vec<StateRaw>) -> PostalDb {
    let mut db = PostalDb::default();

    for s_raw in raw_states {
        let s_idx = db.states.len() as u32;
        let s_city_start = db.cities.len() as u32;

        for c_raw in s_raw.cities {
            let c_idx = db.cities.len() as u32;
            let c_postal_start = db.postal_codes.len() as u32;

            for p_raw in c_raw.postal_codes {
                if p_raw.id.trim().is_empty() || p_raw.code.trim().is_empty() {
                    warn!(city = %c_raw.name, "skipping postal code without id or code");
                    continue;
                }
                db.postal_codes.push(PostalCode {
                    id: p_raw.id,
                    code: p_raw.code.trim().to_owned(),
                    city_idx: c_idx,
                });
            }

            db.cities.push(City {
                id: c_raw.id,
                name: c_raw.name,
                state_idx: s_idx,
                postal_range: c_postal_start..(db.postal_codes.len() as u32),
            });
        }

        db.states.push(State {
            id: s_raw.id,
            name: s_raw.name,
            country_id: s_raw.country_id.filter(|c| !c.trim().is_empty()),
            cities_range: s_city_start..(db.cities.len() as u32),
        });
    }
    db
}
