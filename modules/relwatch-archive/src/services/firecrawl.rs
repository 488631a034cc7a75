// Hosted search via Firecrawl. Every client error becomes SourceUnavailable.

use async_trait::async_trait;
use firecrawl_client::{FirecrawlClient, FirecrawlError, ScrapeOptions, SearchRequest};
use tracing::info;

use relwatch_common::{RelwatchError, Result};

use crate::traits::{HostedHit, HostedSearch};

const PROVIDER: &str = "firecrawl";

pub struct FirecrawlSearch {
    client: FirecrawlClient,
}

impl FirecrawlSearch {
    pub fn new(client: FirecrawlClient) -> Self {
        Self { client }
    }
}

fn unavailable(err: FirecrawlError) -> RelwatchError {
    RelwatchError::unavailable(PROVIDER, err)
}

#[async_trait]
impl HostedSearch for FirecrawlSearch {
    async fn search(&self, provider_query: &str, limit: usize) -> Result<Vec<HostedHit>> {
        let request = SearchRequest {
            query: provider_query.to_string(),
            limit: u32::try_from(limit).unwrap_or(u32::MAX),
            scrape_options: ScrapeOptions::default(),
        };
        let results = self.client.search(&request).await.map_err(unavailable)?;
        info!(query = provider_query, hits = results.len(), "hosted: search complete");

        Ok(results
            .into_iter()
            .map(|r| HostedHit {
                url: r.url,
                title: r.title,
                description: r.description,
                markdown: r.markdown,
            })
            .collect())
    }

    async fn scrape(&self, url: &str) -> Result<String> {
        let data = self.client.scrape(url).await.map_err(unavailable)?;
        data.markdown
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| RelwatchError::unavailable(PROVIDER, format!("no markdown for {url}")))
    }
}
