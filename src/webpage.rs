//! Lightweight webpage fetch: one GET with a browser user agent, then local
//! text extraction.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use url::Url;

use crate::TextBy;
use crate::constants::PRIMARY_REMOVE_SELECTORS;
use crate::error::ServiceError;
use crate::fetch::PageFetcher;
use crate::parse::extract_article;

/// Fetches pages over HTTP, ignoring TLS certificate errors.
pub struct HttpPageFetcher {
    client: Client,
    text_by: TextBy,
}

impl HttpPageFetcher {
    /// Builds a fetcher sending `user_agent` with every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(user_agent: &str, timeout: Duration, text_by: TextBy) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .danger_accept_invalid_certs(true)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, text_by })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_documents(&self, url: &Url) -> Result<Vec<String>, ServiceError> {
        info!("Fetching {url}");
        let response = self.client.get(url.clone()).send().await?;
        let response = ServiceError::check_response(response).await?;
        let html = response.text().await?;

        Ok(page_documents(&html, &self.text_by))
    }
}

/// Text of a fetched page with script and navigation regions dropped.
fn page_documents(html: &str, text_by: &TextBy) -> Vec<String> {
    let article = extract_article(html, text_by, &PRIMARY_REMOVE_SELECTORS);
    debug!(
        "Extracted {} chars ({})",
        article.text.chars().count(),
        article.title.as_deref().unwrap_or("untitled")
    );

    if article.text.is_empty() {
        return Vec::new();
    }
    vec![article.text]
}
