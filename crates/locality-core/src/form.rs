// crates/locality-core/src/form.rs
//! Address draft held by a patient, shipper or profile form.
//!
//! Postal code, city and state move together: selecting a postal code
//! blanks the locality until the resolver fills it, and clearing the postal
//! code clears all three. City and state have no public setters; they only
//! ever come from a [`ResolvedLocality`].
use crate::common::ResolvedLocality;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressDraft {
    address1: String,
    address2: String,
    postal_code_id: Option<String>,
    postal_code: String,
    city_id: Option<String>,
    city: String,
    state_id: Option<String>,
    state: String,
    country_id: Option<String>,
}

/// Address as stored on an existing record (edit mode).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredAddress {
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub zip_code_id: Option<String>,
    pub zip_code: Option<String>,
    pub city_id: Option<String>,
    pub city_name: Option<String>,
    pub state_id: Option<String>,
    pub state_name: Option<String>,
    pub country_id: Option<String>,
}

/// Address part of a create/update payload, sent once the draft validates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSubmission {
    pub address1: String,
    pub address2: String,
    pub zip_code_id: String,
    pub city_id: Option<String>,
    pub state_id: Option<String>,
    pub country_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AddressField {
    Address1,
    PostalCode,
    City,
    State,
}

impl AddressField {
    /// Field key as used by the portal forms.
    pub fn as_str(self) -> &'static str {
        match self {
            AddressField::Address1 => "address1",
            AddressField::PostalCode => "zipCodeId",
            AddressField::City => "city",
            AddressField::State => "state",
        }
    }
}

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation messages per field, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<AddressField, &'static str>);

impl FieldErrors {
    pub fn get(&self, field: AddressField) -> Option<&'static str> {
        self.0.get(&field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AddressField, &'static str)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, msg) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {msg}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}

impl From<StoredAddress> for AddressDraft {
    fn from(s: StoredAddress) -> Self {
        Self {
            address1: s.address1.unwrap_or_default(),
            address2: s.address2.unwrap_or_default(),
            postal_code_id: non_empty(s.zip_code_id),
            postal_code: s.zip_code.unwrap_or_default(),
            city_id: non_empty(s.city_id),
            city: s.city_name.unwrap_or_default(),
            state_id: non_empty(s.state_id),
            state: s.state_name.unwrap_or_default(),
            country_id: non_empty(s.country_id),
        }
    }
}

impl AddressDraft {
    pub fn new(country_id: Option<String>) -> Self {
        Self {
            country_id,
            ..Self::default()
        }
    }

    pub fn address1(&self) -> &str {
        &self.address1
    }

    pub fn address2(&self) -> &str {
        &self.address2
    }

    pub fn postal_code_id(&self) -> Option<&str> {
        self.postal_code_id.as_deref()
    }

    /// Display label of the selected postal code.
    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn city_id(&self) -> Option<&str> {
        self.city_id.as_deref()
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn state_id(&self) -> Option<&str> {
        self.state_id.as_deref()
    }

    pub fn country_id(&self) -> Option<&str> {
        self.country_id.as_deref()
    }

    pub fn set_address1(&mut self, v: impl Into<String>) {
        self.address1 = v.into();
    }

    pub fn set_address2(&mut self, v: impl Into<String>) {
        self.address2 = v.into();
    }

    /// Records a new postal-code selection and blanks the derived locality.
    pub fn select_postal_code(&mut self, id: &str, label: &str) {
        self.postal_code_id = Some(id.to_owned());
        self.postal_code = label.to_owned();
        self.clear_locality();
    }

    /// Clears postal code, city and state in one step.
    pub fn clear_postal_code(&mut self) {
        self.postal_code_id = None;
        self.postal_code.clear();
        self.clear_locality();
    }

    /// True when a stored postal code lacks its city or state.
    pub fn needs_resolution(&self) -> bool {
        self.postal_code_id.is_some()
            && (self.city.trim().is_empty() || self.state.trim().is_empty())
    }

    pub fn has_locality(&self) -> bool {
        !self.city.is_empty() || !self.state.is_empty()
    }

    pub(crate) fn apply_locality(&mut self, loc: &ResolvedLocality) {
        self.city_id = non_empty(Some(loc.city_id.clone()));
        self.city = loc.city_name.clone();
        self.state_id = non_empty(Some(loc.state_id.clone()));
        self.state = loc.state_name.clone();
    }

    pub(crate) fn clear_locality(&mut self) {
        self.city_id = None;
        self.city.clear();
        self.state_id = None;
        self.state.clear();
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errs = BTreeMap::new();
        if self.address1.trim().is_empty() {
            errs.insert(AddressField::Address1, "Enter house / street address");
        }
        if self.postal_code_id.is_none() {
            errs.insert(AddressField::PostalCode, "Select zip code");
        }
        if self.city.trim().is_empty() {
            errs.insert(AddressField::City, "City is required");
        }
        if self.state.trim().is_empty() {
            errs.insert(AddressField::State, "State is required");
        }
        if errs.is_empty() {
            Ok(())
        } else {
            Err(FieldErrors(errs))
        }
    }

    /// Validated, trimmed payload for the create/update call.
    pub fn submission(&self) -> Result<AddressSubmission, FieldErrors> {
        self.validate()?;
        Ok(AddressSubmission {
            address1: self.address1.trim().to_owned(),
            address2: self.address2.trim().to_owned(),
            zip_code_id: self.postal_code_id.clone().unwrap_or_default(),
            city_id: self.city_id.clone(),
            state_id: self.state_id.clone(),
            country_id: self.country_id.clone(),
        })
    }
}
