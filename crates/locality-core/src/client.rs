// crates/locality-core/src/client.rs

// ---------------------------------------------------------------------------
// FILE GUARD: This entire file is skipped if 'http' feature is missing.
// ---------------------------------------------------------------------------
#![cfg(feature = "http")]

//! REST backend for the portal's dropdown endpoints.
//!
//! Both endpoints wrap their payload in `{ "statusCode": 200, "data": ... }`.
//! Cancellation is by drop: when the resolver aborts a task, the pending
//! `reqwest` future is dropped and the connection is abandoned.

use crate::common::{PostalCodeCandidate, ResolvedLocality, SearchRequest};
use crate::error::{LookupError, Result};
use crate::session::SessionStore;
use crate::traits::LookupBackend;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_SEARCH_PATH: &str = "Dropdowns/GetZipCodeDropdown";
pub const DEFAULT_LOCALITY_PATH: &str = "Dropdowns/GetStateAndCityByZipCode";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpConfig {
    pub base_url: String,
    pub search_path: String,
    pub locality_path: String,
    /// Static token; a [`SessionStore`] attached to the backend wins over it.
    pub bearer_token: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_owned(),
            search_path: DEFAULT_SEARCH_PATH.to_owned(),
            locality_path: DEFAULT_LOCALITY_PATH.to_owned(),
            bearer_token: None,
        }
    }
}

impl HttpConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    status_code: Option<u16>,
    data: Option<T>,
}

impl<T> Envelope<T> {
    fn into_data(self) -> Result<Option<T>> {
        match self.status_code {
            Some(200) | None => Ok(self.data),
            Some(code) => Err(LookupError::Status { code }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    config: HttpConfig,
    session: Option<SessionStore>,
}

impl HttpBackend {
    pub fn new(config: HttpConfig) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            config,
            session: None,
        })
    }

    /// Reads the bearer token from `store` at request time.
    pub fn with_session(mut self, store: SessionStore) -> Self {
        self.session = Some(store);
        self
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    fn authorize(&self, rb: RequestBuilder) -> RequestBuilder {
        let from_session = self.session.as_ref().and_then(SessionStore::authorization);
        let header = from_session.or_else(|| {
            self.config
                .bearer_token
                .as_ref()
                .map(|t| format!("Bearer {t}"))
        });
        match header {
            Some(h) => rb.header(AUTHORIZATION, h),
            None => rb,
        }
    }

    async fn read_envelope<T: DeserializeOwned>(resp: Response) -> Result<Option<T>> {
        let resp = resp.error_for_status()?;
        let env: Envelope<T> = resp.json().await?;
        env.into_data()
    }
}

impl LookupBackend for HttpBackend {
    async fn search_postal_codes(&self, req: SearchRequest) -> Result<Vec<PostalCodeCandidate>> {
        let url = self.config.url(&self.config.search_path);
        debug!(%url, query = %req.query, "POST postal code search");
        let resp = self.authorize(self.client.post(url)).json(&req).send().await?;
        Ok(Self::read_envelope(resp).await?.unwrap_or_default())
    }

    async fn resolve_locality(&self, postal_code_id: &str) -> Result<Option<ResolvedLocality>> {
        let url = self.config.url(&self.config.locality_path);
        debug!(%url, postal_code_id, "GET locality");
        let resp = self
            .authorize(self.client.get(url))
            .query(&[("zipCodeId", postal_code_id)])
            .send()
            .await?;
        Self::read_envelope(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slashes() {
        let c = HttpConfig::new("https://api.example.com/");
        assert_eq!(
            c.url("/Dropdowns/GetZipCodeDropdown"),
            "https://api.example.com/Dropdowns/GetZipCodeDropdown"
        );
    }

    #[test]
    fn envelope_status_other_than_200_is_an_error() {
        let env: Envelope<Vec<PostalCodeCandidate>> =
            serde_json::from_str(r#"{"statusCode":404,"data":null}"#).unwrap();
        assert!(matches!(env.into_data(), Err(LookupError::Status { code: 404 })));
    }

    #[test]
    fn envelope_carries_option_shaped_candidates() {
        let env: Envelope<Vec<PostalCodeCandidate>> = serde_json::from_str(
            r#"{"statusCode":200,"data":[{"value":"z1","label":"55001"}]}"#,
        )
        .unwrap();
        let data = env.into_data().unwrap().unwrap();
        assert_eq!(data, vec![PostalCodeCandidate::new("z1", "55001")]);
    }
}
