//! City name suggestions from the French communes API (`geo.api.gouv.fr`).

use std::future::Future;

use reqwest::{Client, Url};
use serde::Deserialize;

use crate::autocomplete::CitySuggestionSource;
use crate::error::SearchError;

const DEFAULT_BASE_URL: &str = "https://geo.api.gouv.fr/";
const DEFAULT_LIMIT: usize = 8;

#[derive(Debug, Deserialize)]
struct Commune {
    nom: String,
}

/// Suggests commune names matching a prefix, most populous first.
#[derive(Debug, Clone)]
pub struct GeoApiCities {
    client: Client,
    base_url: Url,
    limit: usize,
}

impl GeoApiCities {
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new() -> Result<Self, SearchError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`SearchError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(base_url: &str) -> Result<Self, SearchError> {
        let client = Client::builder().user_agent("findgold/0.1").build()?;
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| SearchError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            limit: DEFAULT_LIMIT,
        })
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    fn communes_url(&self, query: &str) -> Url {
        let mut url = self
            .base_url
            .join("communes")
            .unwrap_or_else(|_| self.base_url.clone());
        url.query_pairs_mut()
            .append_pair("nom", query)
            .append_pair("fields", "nom")
            .append_pair("boost", "population")
            .append_pair("limit", &self.limit.to_string());
        url
    }

    async fn fetch(&self, query: &str) -> Result<Vec<String>, SearchError> {
        let url = self.communes_url(query);
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let communes: Vec<Commune> =
            serde_json::from_str(&body).map_err(|e| SearchError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;

        // Homonymous communes (several "Saint-Martin") collapse to one entry.
        let mut names: Vec<String> = Vec::with_capacity(communes.len());
        for commune in communes {
            if !names.contains(&commune.nom) {
                names.push(commune.nom);
            }
        }
        Ok(names)
    }
}

impl CitySuggestionSource for GeoApiCities {
    fn suggest(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<String>, SearchError>> + Send {
        self.fetch(query)
    }
}
