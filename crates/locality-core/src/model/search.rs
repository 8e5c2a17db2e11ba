// crates/locality-core/src/model/search.rs
use crate::common::{DbStats, PostalCodeCandidate, ResolvedLocality, SearchRequest};
use crate::model::flat::{City, PostalCode, PostalDb, State};
use crate::text::fold_key;
use std::collections::HashSet;

impl PostalDb {
    pub fn stats(&self) -> DbStats {
        let countries: HashSet<&str> = self
            .states
            .iter()
            .filter_map(|s| s.country_id.as_deref())
            .collect();
        DbStats {
            postal_codes: self.postal_codes.len(),
            cities: self.cities.len(),
            states: self.states.len(),
            countries: countries.len(),
        }
    }

    /// Postal code by id, with its city and state.
    pub fn find_postal_code(&self, id: &str) -> Option<(&PostalCode, &City, &State)> {
        let pc = self.postal_codes.iter().find(|p| p.id == id)?;
        let city = self.city_of(pc);
        Some((pc, city, self.state_of(city)))
    }

    /// The locality-by-postal-code lookup.
    pub fn locality(&self, postal_code_id: &str) -> Option<ResolvedLocality> {
        let (_, city, state) = self.find_postal_code(postal_code_id)?;
        Some(ResolvedLocality {
            city_id: city.id.clone(),
            city_name: city.name.clone(),
            state_id: state.id.clone(),
            state_name: state.name.clone(),
        })
    }

    /// The candidate search lookup.
    ///
    /// Codes starting with the query (ASCII case-insensitive) rank first,
    /// then codes whose city name contains the folded query; each group is
    /// ordered by code. An empty query lists everything. `page_offset` is a
    /// zero-based page index and a `page_size` of zero means unpaged.
    pub fn search(&self, req: &SearchRequest) -> Vec<PostalCodeCandidate> {
        let q = req.query.trim();
        let folded = fold_key(q);
        let country = req.country_id.as_deref();

        let mut by_code: Vec<&PostalCode> = Vec::new();
        let mut by_city: Vec<&PostalCode> = Vec::new();

        for pc in &self.postal_codes {
            let city = self.city_of(pc);
            if let Some(want) = country {
                if self.state_of(city).country_id.as_deref() != Some(want) {
                    continue;
                }
            }
            if starts_with_ignore_case(&pc.code, q) {
                by_code.push(pc);
            } else if !folded.is_empty() && fold_key(&city.name).contains(&folded) {
                by_city.push(pc);
            }
        }

        by_code.sort_by(|a, b| a.code.cmp(&b.code));
        by_city.sort_by(|a, b| a.code.cmp(&b.code));

        let hits = by_code.into_iter().chain(by_city);
        let page: Box<dyn Iterator<Item = &PostalCode>> = if req.page_size == 0 {
            Box::new(hits)
        } else {
            let size = req.page_size as usize;
            Box::new(hits.skip(req.page_offset as usize * size).take(size))
        };
        page.map(|pc| PostalCodeCandidate::new(pc.id.clone(), pc.code.clone()))
            .collect()
    }
}

fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    haystack.len() >= prefix.len()
        && haystack.is_char_boundary(prefix.len())
        && haystack[..prefix.len()].eq_ignore_ascii_case(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::convert::{from_raw, CityRaw, PostalCodeRaw, StateRaw};

    fn db() -> PostalDb {
        from_raw(vec![
            StateRaw {
                id: "s2".into(),
                name: "IL".into(),
                country_id: Some("US".into()),
                cities: vec![CityRaw {
                    id: "c9".into(),
                    name: "Springfield".into(),
                    postal_codes: vec![
                        PostalCodeRaw { id: "z2".into(), code: "55002".into() },
                        PostalCodeRaw { id: "z1".into(), code: "55001".into() },
                    ],
                }],
            },
            StateRaw {
                id: "s7".into(),
                name: "Bayern".into(),
                country_id: Some("DE".into()),
                cities: vec![CityRaw {
                    id: "c3".into(),
                    name: "München".into(),
                    postal_codes: vec![PostalCodeRaw { id: "z9".into(), code: "80331".into() }],
                }],
            },
        ])
    }

    fn req(q: &str) -> SearchRequest {
        SearchRequest {
            query: q.into(),
            page_offset: 0,
            page_size: 20,
            country_id: None,
        }
    }

    #[test]
    fn prefix_matches_are_sorted_by_code() {
        let hits = db().search(&req("550"));
        let labels: Vec<_> = hits.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["55001", "55002"]);
    }

    #[test]
    fn city_names_match_accent_insensitively() {
        let hits = db().search(&req("munch"));
        assert_eq!(hits, vec![PostalCodeCandidate::new("z9", "80331")]);
    }

    #[test]
    fn country_filter_and_paging() {
        let mut r = req("");
        r.country_id = Some("US".into());
        r.page_size = 1;
        r.page_offset = 1;
        assert_eq!(db().search(&r), vec![PostalCodeCandidate::new("z2", "55002")]);
    }

    #[test]
    fn locality_walks_parent_indices() {
        let loc = db().locality("z1").unwrap();
        assert_eq!(loc.city_name, "Springfield");
        assert_eq!(loc.state_name, "IL");
        assert!(db().locality("nope").is_none());
    }

    #[test]
    fn stats_count_distinct_countries() {
        let s = db().stats();
        assert_eq!((s.postal_codes, s.cities, s.states, s.countries), (3, 2, 2, 2));
    }
}
