// Trait boundaries for the retrieval cascade.
//
// Three seams:
// - CorpusStore: durable article corpus keyed by URL
// - HostedSearch: hosted search-and-scrape provider
// - BrowserAutomation: remote browser sessions driven by source selectors
//
// Production implementations live in store.rs and services/; mocks in testing.rs.

use async_trait::async_trait;

use relwatch_common::{Article, Result, SearchQuery, SourceConfig};

/// What an upsert did to the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Inserted,
    Updated,
}

#[async_trait]
pub trait CorpusStore: Send + Sync {
    /// Folded-substring term match over title+body+summary, filtered by the
    /// query's sources and date range, newest first, capped at `query.limit`.
    async fn find_by_query(&self, query: &SearchQuery) -> Result<Vec<Article>>;

    /// Insert by URL, or merge into the existing record. Durable on return.
    async fn upsert(&self, article: Article) -> Result<Upserted>;

    async fn get(&self, url: &str) -> Result<Option<Article>>;

    /// Running total of inserted articles.
    async fn total_count(&self) -> Result<usize>;
}

/// One hit from the hosted provider, already scraped to markdown when it could be.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostedHit {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub markdown: Option<String>,
}

#[async_trait]
pub trait HostedSearch: Send + Sync {
    /// Run a provider query string (with `site:`/`after:`/`lang:` operators).
    async fn search(&self, provider_query: &str, limit: usize) -> Result<Vec<HostedHit>>;

    /// Main-content markdown of a single page.
    async fn scrape(&self, url: &str) -> Result<String>;
}

#[async_trait]
pub trait BrowserAutomation: Send + Sync {
    /// Submit `terms` through the source's search form in a fresh session and
    /// return the rendered results page once the result list has appeared.
    async fn search_page(&self, source: &SourceConfig, terms: &str) -> Result<String>;

    /// Rendered HTML of an article page.
    async fn article_page(&self, source: &SourceConfig, url: &str) -> Result<String>;
}
