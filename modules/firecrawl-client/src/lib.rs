pub mod error;
pub mod types;

pub use error::{FirecrawlError, Result};
pub use types::{ScrapeData, ScrapeOptions, SearchRequest, SearchResult};

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use types::{Envelope, ScrapeRequest};

pub const DEFAULT_BASE_URL: &str = "https://api.firecrawl.dev";

pub struct FirecrawlClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl FirecrawlClient {
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Web search with each hit scraped to markdown in the same call.
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>> {
        tracing::debug!(query = %request.query, limit = request.limit, "Firecrawl search");
        let data: Option<Vec<SearchResult>> = self.post("/v1/search", request).await?;
        Ok(data.unwrap_or_default())
    }

    /// Scrape a single page to markdown, main content only.
    pub async fn scrape(&self, url: &str) -> Result<ScrapeData> {
        let request = ScrapeRequest {
            url: url.to_string(),
            formats: vec!["markdown".to_string()],
            only_main_content: true,
            wait_for: 2000,
        };
        let data: Option<ScrapeData> = self.post("/v1/scrape", &request).await?;
        data.ok_or_else(|| FirecrawlError::Parse(format!("scrape of {url} returned no data")))
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(FirecrawlError::Api {
                status: status.as_u16(),
                message: text,
            });
        }
        decode_envelope(&text)
    }
}

/// Unwrap `{ success, data, error }`, turning `success: false` into an error.
pub fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<Option<T>> {
    let envelope: Envelope<T> = serde_json::from_str(body)?;
    if !envelope.success {
        return Err(FirecrawlError::Unsuccessful(
            envelope.error.unwrap_or_else(|| "unknown error".to_string()),
        ));
    }
    Ok(envelope.data)
}
