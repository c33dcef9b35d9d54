//! Wikipedia lookup through the MediaWiki action API: a title search followed
//! by a plain-text extract of the best hit.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::ServiceError;
use crate::fetch::WikipediaLookup;
use crate::text::truncate_chars;

pub struct WikipediaClient {
    client: Client,
    /// API URL with `{lang}` standing in for the language edition.
    api_template: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    query: Option<ExtractQuery>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: HashMap<String, ExtractPage>,
}

#[derive(Debug, Deserialize)]
struct ExtractPage {
    #[serde(default)]
    missing: Option<serde_json::Value>,
    extract: Option<String>,
}

impl WikipediaClient {
    /// Creates a client for the public Wikipedia API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, ServiceError> {
        Self::with_api_template(
            user_agent,
            timeout,
            "https://{lang}.wikipedia.org/w/api.php",
        )
    }

    /// Creates a client for a MediaWiki API at a custom location.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_api_template(
        user_agent: &str,
        timeout: Duration,
        api_template: impl Into<String>,
    ) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_template: api_template.into(),
        })
    }

    fn api_url(&self, lang: &str) -> String {
        self.api_template.replace("{lang}", lang)
    }

    async fn query<T: DeserializeOwned>(
        &self,
        lang: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ServiceError> {
        let response = self
            .client
            .get(self.api_url(lang))
            .query(&[("action", "query"), ("format", "json")])
            .query(params)
            .send()
            .await?;
        let response = ServiceError::check_response(response).await?;

        Ok(response.json::<T>().await?)
    }

    async fn best_title(&self, lang: &str, query: &str) -> Result<Option<String>, ServiceError> {
        let response: SearchResponse = self
            .query(
                lang,
                &[("list", "search"), ("srsearch", query), ("srlimit", "1")],
            )
            .await?;

        Ok(response
            .query
            .and_then(|query| query.search.into_iter().next())
            .map(|hit| hit.title))
    }

    async fn extract(&self, lang: &str, title: &str) -> Result<Option<String>, ServiceError> {
        let response: ExtractResponse = self
            .query(
                lang,
                &[
                    ("prop", "extracts"),
                    ("explaintext", "1"),
                    ("redirects", "1"),
                    ("titles", title),
                ],
            )
            .await?;

        Ok(first_extract(response))
    }
}

fn first_extract(response: ExtractResponse) -> Option<String> {
    response
        .query?
        .pages
        .into_values()
        .filter(|page| page.missing.is_none())
        .find_map(|page| page.extract)
        .filter(|extract| !extract.trim().is_empty())
}

#[async_trait]
impl WikipediaLookup for WikipediaClient {
    async fn lookup(
        &self,
        lang: &str,
        query: &str,
        max_chars: usize,
    ) -> Result<Option<String>, ServiceError> {
        info!("Searching {lang}.wikipedia.org for \"{query}\"");
        let Some(title) = self.best_title(lang, query).await? else {
            debug!("No Wikipedia article matches \"{query}\"");
            return Ok(None);
        };

        debug!("Loading Wikipedia article \"{title}\"");
        Ok(self
            .extract(lang, &title)
            .await?
            .map(|text| truncate_chars(&text, max_chars).to_owned()))
    }
}
