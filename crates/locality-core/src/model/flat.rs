// crates/locality-core/src/model/flat.rs
use crate::error::{LookupError, Result};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// The postal dataset.
/// Laid out as "Structure of Arrays": children are contiguous ranges in the
/// master vectors and point back at their parent by index.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PostalDb {
    /// Master list of all states.
    pub states: Vec<State>,
    /// Master list of all cities. Contiguous per state.
    pub cities: Vec<City>,
    /// Master list of all postal codes. Contiguous per city.
    pub postal_codes: Vec<PostalCode>,
}

/// A State/Region entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct State {
    pub id: String,
    pub name: String,
    pub country_id: Option<String>,
    pub cities_range: Range<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct City {
    pub id: String,
    pub name: String,
    pub state_idx: u32,
    pub postal_range: Range<u32>,
}

/// A postal code. Optimized for minimal size; everything else is reached
/// through `city_idx`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PostalCode {
    pub id: String,
    pub code: String,
    pub city_idx: u32,
}

impl PostalDb {
    pub fn city_of(&self, pc: &PostalCode) -> &City {
        &self.cities[pc.city_idx as usize]
    }

    pub fn state_of(&self, city: &City) -> &State {
        &self.states[city.state_idx as usize]
    }

    pub fn cities_for_state(&self, state: &State) -> &[City] {
        &self.cities[state.cities_range.start as usize..state.cities_range.end as usize]
    }

    pub fn postal_codes_for_city(&self, city: &City) -> &[PostalCode] {
        &self.postal_codes[city.postal_range.start as usize..city.postal_range.end as usize]
    }

    /// Checks that every parent index and child range points inside its
    /// master vector. The accessors above index directly and rely on this.
    pub fn check_indices(&self) -> Result<()> {
        for s in &self.states {
            check_range(&s.cities_range, self.cities.len(), "state", &s.id)?;
        }
        for c in &self.cities {
            if c.state_idx as usize >= self.states.len() {
                return Err(bad_index("city", &c.id, "state_idx", c.state_idx));
            }
            check_range(&c.postal_range, self.postal_codes.len(), "city", &c.id)?;
        }
        for pc in &self.postal_codes {
            if pc.city_idx as usize >= self.cities.len() {
                return Err(bad_index("postal code", &pc.id, "city_idx", pc.city_idx));
            }
        }
        Ok(())
    }
}

fn check_range(r: &Range<u32>, len: usize, kind: &str, id: &str) -> Result<()> {
    if r.start > r.end || r.end as usize > len {
        return Err(LookupError::InvalidData(format!(
            "{kind} '{id}' has child range {}..{} outside 0..{len}",
            r.start, r.end
        )));
    }
    Ok(())
}

fn bad_index(kind: &str, id: &str, field: &str, idx: u32) -> LookupError {
    LookupError::InvalidData(format!("{kind} '{id}' has out-of-range {field} {idx}"))
}
