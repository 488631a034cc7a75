// Archive: the public entry point for retrieval.
// `search` runs the local → hosted → browser cascade; `ensure_body`
// backfills article text; `harvest` warms the corpus for a keyword list.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use futures::StreamExt;
use tracing::{debug, info, warn};

use browserless_client::BrowserlessClient;
use firecrawl_client::FirecrawlClient;
use relwatch_common::{
    normalize, AppConfig, Article, CancellationToken, DateRange, FileConfig, RelwatchError, Result,
    RetrievalConfig, SearchQuery, SourceConfig, SourceRegistry,
};

use crate::cascade::{Cascade, Step};
use crate::extract;
use crate::hosted::{article_from_hit, provider_query};
use crate::services::{BrowserlessAutomation, FirecrawlSearch};
use crate::store::JsonCorpusStore;
use crate::terms::QueryTerms;
use crate::traits::{BrowserAutomation, CorpusStore, HostedSearch};

pub struct Archive {
    store: Arc<dyn CorpusStore>,
    hosted: Option<Arc<dyn HostedSearch>>,
    browser: Option<Arc<dyn BrowserAutomation>>,
    registry: Arc<SourceRegistry>,
    settings: RetrievalConfig,
}

/// Totals from a [`Archive::harvest`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestReport {
    pub keywords: usize,
    pub articles_seen: usize,
    pub bodies_fetched: usize,
    pub failures: usize,
}

impl Archive {
    pub fn new(
        store: Arc<dyn CorpusStore>,
        registry: Arc<SourceRegistry>,
        settings: RetrievalConfig,
    ) -> Self {
        Self {
            store,
            hosted: None,
            browser: None,
            registry,
            settings,
        }
    }

    pub fn with_hosted(mut self, hosted: Arc<dyn HostedSearch>) -> Self {
        self.hosted = Some(hosted);
        self
    }

    pub fn with_browser(mut self, browser: Arc<dyn BrowserAutomation>) -> Self {
        self.browser = Some(browser);
        self
    }

    /// Wire the JSON corpus, Firecrawl (when a key is set) and Browserless.
    pub async fn connect(app: &AppConfig, file: &FileConfig) -> anyhow::Result<Self> {
        let settings = file.retrieval.clone();
        let timeout = Duration::from_secs(settings.request_timeout_secs);
        let store = JsonCorpusStore::open(app.corpus_path())
            .await
            .with_context(|| format!("Failed to open corpus at {}", app.corpus_path().display()))?;
        let registry = Arc::new(file.registry()?);

        let browser = BrowserlessClient::new(
            &app.browserless_url,
            app.browserless_token.as_deref(),
            timeout,
        )
        .context("Failed to build Browserless client")?;

        let mut archive = Archive::new(Arc::new(store), registry, settings.clone())
            .with_browser(Arc::new(BrowserlessAutomation::new(browser, &settings)));

        match app.firecrawl_api_key.as_deref() {
            Some(key) => {
                let client = FirecrawlClient::new(key, &app.firecrawl_api_url, timeout)
                    .context("Failed to build Firecrawl client")?;
                archive = archive.with_hosted(Arc::new(FirecrawlSearch::new(client)));
            }
            None => info!("FIRECRAWL_API_KEY not set; hosted search disabled"),
        }

        Ok(archive)
    }

    pub fn store(&self) -> &Arc<dyn CorpusStore> {
        &self.store
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    // --- Search ---

    /// Deduplicated articles for `query`, at most `query.limit` of them.
    /// Single-source failures are logged and skipped, never returned.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<Article>> {
        let query = &self.resolve_sources(query);
        let local = self.store.find_by_query(query).await?;
        if QueryTerms::parse(&query.terms).is_empty() {
            debug!(hits = local.len(), "search: blank terms, local only");
            return Ok(local);
        }

        let mut cascade = Cascade::new(query.limit, local);
        info!(
            terms = %query.terms,
            local = query.limit - cascade.remaining(),
            limit = query.limit,
            "search: corpus checked"
        );

        while let Some(step) = cascade.advance() {
            let need = cascade.remaining();
            let online = match step {
                Step::Hosted => self.hosted_step(query, need).await,
                Step::Browser => self.browser_step(query, need, &cascade).await,
            };
            let accepted = cascade.absorb(online);
            info!(?step, accepted = accepted.len(), still_needed = cascade.remaining(), "search: stage done");
            self.persist(&accepted).await;
        }

        Ok(cascade.finish())
    }

    /// `query` with each source filter replaced by its registered display
    /// name, so a key such as "hurriyet" also matches stored "Hürriyet" rows.
    /// Unknown names pass through unchanged.
    fn resolve_sources(&self, query: &SearchQuery) -> SearchQuery {
        let sources = query
            .sources
            .iter()
            .map(|name| match self.registry.by_name(name) {
                Some(source) => source.name.clone(),
                None => name.clone(),
            })
            .collect();
        query.clone().with_sources(sources)
    }

    /// [`search`](Self::search) raced against `token`. On cancellation the
    /// in-flight requests are dropped and partial results discarded.
    pub async fn search_cancellable(
        &self,
        query: &SearchQuery,
        token: &CancellationToken,
    ) -> Result<Vec<Article>> {
        token.check()?;
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(RelwatchError::Cancelled),
            result = self.search(query) => result,
        }
    }

    async fn hosted_step(&self, query: &SearchQuery, need: usize) -> Vec<Article> {
        let Some(hosted) = &self.hosted else {
            debug!("search: no hosted provider configured");
            return Vec::new();
        };

        let provider_query = provider_query(query, &self.registry, &self.settings.language);
        match hosted.search(&provider_query, need).await {
            Ok(hits) => hits
                .into_iter()
                .filter_map(|hit| article_from_hit(hit, &self.registry))
                .filter(|a| query.accepts_date(a.published_date))
                .collect(),
            Err(e) => {
                warn!(error = %e, "search: hosted provider failed, falling back to browser");
                Vec::new()
            }
        }
    }

    /// The sources the browser step should try, in registry order.
    pub fn browser_candidates(&self, query: &SearchQuery) -> Vec<SourceConfig> {
        if query.sources.is_empty() {
            return self
                .registry
                .iter()
                .take(self.settings.default_browser_sources)
                .cloned()
                .collect();
        }

        for name in &query.sources {
            if self.registry.by_name(name).is_none() {
                warn!(source = %name, "search: requested source not registered, skipping");
            }
        }
        self.registry
            .iter()
            .filter(|s| {
                query
                    .sources
                    .iter()
                    .any(|name| self.registry.by_name(name).is_some_and(|m| m.key == s.key))
            })
            .cloned()
            .collect()
    }

    async fn browser_step(&self, query: &SearchQuery, need: usize, cascade: &Cascade) -> Vec<Article> {
        let Some(browser) = &self.browser else {
            debug!("search: no browser automation configured");
            return Vec::new();
        };

        let candidates = self.browser_candidates(query);
        let concurrency = self.settings.browser_concurrency.max(1);
        let terms = query.terms.as_str();

        let mut outcomes = std::pin::pin!(futures::stream::iter(candidates)
            .map(|source| {
                let browser = Arc::clone(browser);
                async move {
                    let result = scrape_source(browser.as_ref(), &source, terms).await;
                    (source, result)
                }
            })
            .buffered(concurrency));

        let mut collected: Vec<Article> = Vec::new();
        while let Some((source, result)) = outcomes.next().await {
            match result {
                Ok(articles) => {
                    let before = collected.len();
                    for article in articles {
                        if collected.len() >= need {
                            break;
                        }
                        if !query.accepts_date(article.published_date)
                            || cascade.contains(&article.url)
                            || collected.iter().any(|a| a.url == article.url)
                        {
                            continue;
                        }
                        collected.push(article);
                    }
                    info!(source = %source.name, added = collected.len() - before, "browser: source scraped");
                }
                Err(e) => warn!(source = %source.name, error = %e, "browser: source failed, skipping"),
            }
            if collected.len() >= need {
                break;
            }
        }

        collected
    }

    async fn persist(&self, articles: &[Article]) {
        for article in articles {
            if let Err(e) = self.store.upsert(article.clone()).await {
                warn!(url = %article.url, error = %e, "search: failed to persist article");
            }
        }
    }

    // --- Content ---

    /// Make sure `article` carries body text. Already-fetched articles come
    /// back unchanged; otherwise hosted scrape first, browser second.
    pub async fn ensure_body(&self, mut article: Article) -> Result<Article> {
        if article.fetched && article.has_body() {
            return Ok(article);
        }

        let source = self.registry.require(&article.source)?.clone();
        let body = self.fetch_body(&source, &article.url).await?;

        article.body = Some(body);
        article.fetched = true;
        article.fetched_at = Some(Utc::now());

        if let Err(e) = self.store.upsert(article.clone()).await {
            warn!(url = %article.url, error = %e, "content: failed to persist body");
        }
        Ok(article)
    }

    pub async fn ensure_body_cancellable(
        &self,
        article: Article,
        token: &CancellationToken,
    ) -> Result<Article> {
        token.check()?;
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(RelwatchError::Cancelled),
            result = self.ensure_body(article) => result,
        }
    }

    async fn fetch_body(&self, source: &SourceConfig, url: &str) -> Result<String> {
        let mut last_error = None;

        if let Some(hosted) = &self.hosted {
            match hosted.scrape(url).await {
                Ok(markdown) => return Ok(markdown),
                Err(e) => {
                    warn!(url, error = %e, "content: hosted scrape failed, trying browser");
                    last_error = Some(e);
                }
            }
        }

        if let Some(browser) = &self.browser {
            match browser.article_page(source, url).await {
                Ok(html) => {
                    if let Some(text) = extract::article_text(&html, source)? {
                        return Ok(text);
                    }
                    let markdown = extract::readable_markdown(&html, url);
                    if !markdown.is_empty() {
                        debug!(url, "content: selector empty, used readability");
                        return Ok(markdown);
                    }
                    last_error = Some(RelwatchError::unavailable(
                        source.key.clone(),
                        format!("no article text at {url}"),
                    ));
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            RelwatchError::unavailable("content", "no hosted or browser provider configured")
        }))
    }

    // --- Harvest ---

    /// Search each keyword and backfill bodies for every hit. Failures are
    /// counted and logged per keyword / per article.
    pub async fn harvest(
        &self,
        keywords: &[String],
        sources: &[String],
        date_range: Option<DateRange>,
        limit: usize,
        token: &CancellationToken,
    ) -> Result<HarvestReport> {
        let mut report = HarvestReport::default();

        for keyword in keywords {
            token.check()?;
            report.keywords += 1;

            let mut query = SearchQuery::new(keyword.clone())
                .with_sources(sources.to_vec())
                .with_limit(limit);
            query.date_range = date_range;

            let articles = match self.search_cancellable(&query, token).await {
                Ok(articles) => articles,
                Err(RelwatchError::Cancelled) => return Err(RelwatchError::Cancelled),
                Err(e) => {
                    warn!(keyword = %keyword, error = %e, "harvest: search failed");
                    report.failures += 1;
                    continue;
                }
            };
            report.articles_seen += articles.len();

            for article in articles.into_iter().filter(|a| !a.has_body()) {
                let url = article.url.clone();
                match self.ensure_body_cancellable(article, token).await {
                    Ok(_) => report.bodies_fetched += 1,
                    Err(RelwatchError::Cancelled) => return Err(RelwatchError::Cancelled),
                    Err(e) => {
                        warn!(url = %url, error = %e, "harvest: body fetch failed");
                        report.failures += 1;
                    }
                }
            }
            info!(keyword = %keyword, seen = report.articles_seen, "harvest: keyword done");
        }

        Ok(report)
    }
}

/// One browser session against one source: search, extract rows, normalize dates.
async fn scrape_source(
    browser: &dyn BrowserAutomation,
    source: &SourceConfig,
    terms: &str,
) -> Result<Vec<Article>> {
    let html = browser.search_page(source, terms).await?;
    let rows = extract::search_results(&html, source)?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let date = normalize(&row.date_text, Some(source.date_format));
            Article::new(row.url, row.title, source.name.clone())
                .with_date(date)
                .with_summary(row.summary)
        })
        .collect())
}
