// Test mocks for the retrieval cascade.
//
// Mocks matching the trait boundaries:
// - MockHostedSearch (HostedSearch): canned hits, optional failure, call counts
// - MockBrowser (BrowserAutomation): HashMap-based source key → results HTML, optional delays
// - FailingStore (CorpusStore): serves seeded articles, rejects every write
//
// Plus fixtures for sources with simple selectors and their HTML.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use relwatch_common::{
    Article, DateFormat, RelwatchError, Result, SearchQuery, Selectors, SourceConfig,
    SourceRegistry,
};

use crate::traits::{BrowserAutomation, CorpusStore, HostedHit, HostedSearch, Upserted};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A source on `https://{host}` whose pages use `li.result` rows.
pub fn test_source(key: &str, name: &str, host: &str) -> SourceConfig {
    SourceConfig {
        key: key.to_string(),
        name: name.to_string(),
        base_url: format!("https://{host}"),
        search_url: format!("https://{host}/arama"),
        date_format: DateFormat::DayMonthYearDotted,
        selectors: Selectors {
            search_input: "input[name=q]".to_string(),
            search_button: "button".to_string(),
            result_list: "li.result".to_string(),
            title: "a.title".to_string(),
            date: ".date".to_string(),
            summary: ".spot".to_string(),
            content: "div.body p".to_string(),
        },
    }
}

/// Registry of `(key, name, host)` test sources, in order.
pub fn test_registry(sources: &[(&str, &str, &str)]) -> SourceRegistry {
    SourceRegistry::new(
        sources
            .iter()
            .map(|(k, n, h)| test_source(k, n, h))
            .collect(),
    )
    .expect("test registry is valid")
}

/// Search-results page with one `li.result` per `(title, href, date, summary)`.
pub fn results_html(rows: &[(&str, &str, &str, &str)]) -> String {
    let items: String = rows
        .iter()
        .map(|(title, href, date, summary)| {
            format!(
                r#"<li class="result"><a class="title" href="{href}">{title}</a>
                   <span class="date">{date}</span><p class="spot">{summary}</p></li>"#
            )
        })
        .collect();
    format!("<html><body><ul>{items}</ul></body></html>")
}

/// Article page whose paragraphs sit under `div.body`.
pub fn article_html(paragraphs: &[&str]) -> String {
    let ps: String = paragraphs.iter().map(|p| format!("<p>{p}</p>")).collect();
    format!(r#"<html><body><div class="body">{ps}</div></body></html>"#)
}

// ---------------------------------------------------------------------------
// MockHostedSearch
// ---------------------------------------------------------------------------

pub struct MockHostedSearch {
    hits: Vec<HostedHit>,
    scrapes: HashMap<String, String>,
    failing: bool,
    search_calls: AtomicUsize,
    scrape_calls: AtomicUsize,
    last_query: Mutex<Option<(String, usize)>>,
}

impl MockHostedSearch {
    pub fn new() -> Self {
        Self {
            hits: Vec::new(),
            scrapes: HashMap::new(),
            failing: false,
            search_calls: AtomicUsize::new(0),
            scrape_calls: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        }
    }

    /// Every call fails with `SourceUnavailable`.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new()
        }
    }

    pub fn on_hit(mut self, url: &str, title: &str, markdown: Option<&str>) -> Self {
        self.hits.push(HostedHit {
            url: url.to_string(),
            title: Some(title.to_string()),
            description: None,
            markdown: markdown.map(str::to_string),
        });
        self
    }

    pub fn on_scrape(mut self, url: &str, markdown: &str) -> Self {
        self.scrapes.insert(url.to_string(), markdown.to_string());
        self
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn scrape_calls(&self) -> usize {
        self.scrape_calls.load(Ordering::SeqCst)
    }

    /// Provider query string and limit of the most recent search.
    pub fn last_query(&self) -> Option<(String, usize)> {
        self.last_query.lock().unwrap().clone()
    }
}

impl Default for MockHostedSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostedSearch for MockHostedSearch {
    async fn search(&self, provider_query: &str, limit: usize) -> Result<Vec<HostedHit>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some((provider_query.to_string(), limit));
        if self.failing {
            return Err(RelwatchError::unavailable("mock-hosted", "service down"));
        }
        Ok(self.hits.iter().take(limit).cloned().collect())
    }

    async fn scrape(&self, url: &str) -> Result<String> {
        self.scrape_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(RelwatchError::unavailable("mock-hosted", "service down"));
        }
        self.scrapes
            .get(url)
            .cloned()
            .ok_or_else(|| RelwatchError::unavailable("mock-hosted", format!("no scrape for {url}")))
    }
}

// ---------------------------------------------------------------------------
// MockBrowser
// ---------------------------------------------------------------------------

/// Returns `Err` for sources and URLs with nothing registered.
pub struct MockBrowser {
    searches: HashMap<String, String>,
    articles: HashMap<String, String>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    hang: bool,
    search_calls: Mutex<Vec<String>>,
    article_calls: AtomicUsize,
}

impl MockBrowser {
    pub fn new() -> Self {
        Self {
            searches: HashMap::new(),
            articles: HashMap::new(),
            failing: HashSet::new(),
            delays: HashMap::new(),
            hang: false,
            search_calls: Mutex::new(Vec::new()),
            article_calls: AtomicUsize::new(0),
        }
    }

    /// Every call waits forever, for cancellation tests.
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::new()
        }
    }

    pub fn on_search(mut self, source_key: &str, html: &str) -> Self {
        self.searches.insert(source_key.to_string(), html.to_string());
        self
    }

    pub fn failing_source(mut self, source_key: &str) -> Self {
        self.failing.insert(source_key.to_string());
        self
    }

    /// The source's results page arrives only after `delay`.
    pub fn delayed(mut self, source_key: &str, delay: Duration) -> Self {
        self.delays.insert(source_key.to_string(), delay);
        self
    }

    pub fn on_article(mut self, url: &str, html: &str) -> Self {
        self.articles.insert(url.to_string(), html.to_string());
        self
    }

    /// Source keys searched, in call order.
    pub fn searched(&self) -> Vec<String> {
        self.search_calls.lock().unwrap().clone()
    }

    pub fn article_calls(&self) -> usize {
        self.article_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockBrowser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrowserAutomation for MockBrowser {
    async fn search_page(&self, source: &SourceConfig, _terms: &str) -> Result<String> {
        self.search_calls.lock().unwrap().push(source.key.clone());
        if self.hang {
            std::future::pending::<()>().await;
        }
        if let Some(delay) = self.delays.get(&source.key) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(&source.key) {
            return Err(RelwatchError::unavailable(
                source.key.clone(),
                "waiting for selector timed out",
            ));
        }
        self.searches
            .get(&source.key)
            .cloned()
            .ok_or_else(|| RelwatchError::unavailable(source.key.clone(), "no results page"))
    }

    async fn article_page(&self, source: &SourceConfig, url: &str) -> Result<String> {
        self.article_calls.fetch_add(1, Ordering::SeqCst);
        if self.hang {
            std::future::pending::<()>().await;
        }
        self.articles
            .get(url)
            .cloned()
            .ok_or_else(|| RelwatchError::unavailable(source.key.clone(), format!("no page {url}")))
    }
}

// ---------------------------------------------------------------------------
// FailingStore
// ---------------------------------------------------------------------------

/// Serves `seed` for lookups; every upsert fails with `Persistence`.
pub struct FailingStore {
    seed: Vec<Article>,
    upsert_attempts: AtomicUsize,
}

impl FailingStore {
    pub fn new(seed: Vec<Article>) -> Self {
        Self {
            seed,
            upsert_attempts: AtomicUsize::new(0),
        }
    }

    pub fn upsert_attempts(&self) -> usize {
        self.upsert_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CorpusStore for FailingStore {
    async fn find_by_query(&self, query: &SearchQuery) -> Result<Vec<Article>> {
        Ok(self.seed.iter().take(query.limit).cloned().collect())
    }

    async fn upsert(&self, _article: Article) -> Result<Upserted> {
        self.upsert_attempts.fetch_add(1, Ordering::SeqCst);
        Err(RelwatchError::Persistence("disk full".to_string()))
    }

    async fn get(&self, url: &str) -> Result<Option<Article>> {
        Ok(self.seed.iter().find(|a| a.url == url).cloned())
    }

    async fn total_count(&self) -> Result<usize> {
        Ok(self.seed.len())
    }
}
