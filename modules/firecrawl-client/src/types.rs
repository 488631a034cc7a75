use serde::{Deserialize, Serialize};

// --- Requests ---

#[derive(Debug, Clone, Serialize)]
pub struct ScrapeOptions {
    pub formats: Vec<String>,
    #[serde(rename = "onlyMainContent")]
    pub only_main_content: bool,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            formats: vec!["markdown".to_string()],
            only_main_content: true,
        }
    }
}

/// Body for `POST /v1/search`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub query: String,
    pub limit: u32,
    #[serde(rename = "scrapeOptions")]
    pub scrape_options: ScrapeOptions,
}

/// Body for `POST /v1/scrape`.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeRequest {
    pub url: String,
    pub formats: Vec<String>,
    #[serde(rename = "onlyMainContent")]
    pub only_main_content: bool,
    /// Milliseconds to let client-side rendering settle.
    #[serde(rename = "waitFor")]
    pub wait_for: u64,
}

// --- Responses ---

/// Every Firecrawl response is wrapped in `{ success, data, error }`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

/// One hit from `/v1/search`. Scraped fields are present only when
/// `scrapeOptions` asked for them and the page could be fetched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResult {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub markdown: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScrapeData {
    pub markdown: Option<String>,
}
