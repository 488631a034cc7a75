// Analyzer: the subject-level entry point.
// analyze = query plan → cascade search per query → body backfill →
// metrics + insights → stored snapshot.

use std::cmp::Reverse;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use relwatch_archive::Archive;
use relwatch_common::lexicon::Keyword;
use relwatch_common::{
    fold, AnalysisResult, AnalysisSummary, AnalyzeOptions, AppConfig, Article, CancellationToken,
    ConnectionCategory, FileConfig, Lexicon, ListOptions, RelwatchError, Result, RosterEntry,
    SearchQuery, SortBy,
};

use crate::insights::{connections, key_events, key_people};
use crate::roster::{RosterProvider, StaticRoster};
use crate::scoring::compute_metrics;
use crate::store::JsonAnalysisStore;
use crate::summary::{no_data_sentence, summary_text};

/// Entries kept per list in a stored analysis.
pub const TOP_N: usize = 5;

const SUBJECT_QUERY_KEYWORDS: usize = 5;
const PERSON_QUERY_KEYWORDS: usize = 3;
const PERSON_QUERIES: usize = 3;

pub struct Analyzer {
    archive: Arc<Archive>,
    store: Arc<JsonAnalysisStore>,
    lexicon: Arc<Lexicon>,
    roster: Arc<dyn RosterProvider>,
}

impl Analyzer {
    pub fn new(
        archive: Arc<Archive>,
        store: Arc<JsonAnalysisStore>,
        lexicon: Arc<Lexicon>,
        roster: Arc<dyn RosterProvider>,
    ) -> Self {
        Self {
            archive,
            store,
            lexicon,
            roster,
        }
    }

    pub async fn connect(app: &AppConfig, file: &FileConfig) -> anyhow::Result<Self> {
        let archive = Archive::connect(app, file).await?;
        let store = JsonAnalysisStore::open(app.analyses_path())
            .await
            .with_context(|| format!("Failed to open analyses at {}", app.analyses_path().display()))?;
        let lexicon = file.lexicon()?;
        let roster = StaticRoster::new(file.roster.clone());

        Ok(Self::new(Arc::new(archive), Arc::new(store), lexicon, Arc::new(roster)))
    }

    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    pub async fn analyze(&self, subject: &str, options: &AnalyzeOptions) -> Result<AnalysisResult> {
        self.analyze_cancellable(subject, options, &CancellationToken::new())
            .await
    }

    /// Run a full analysis for `subject` and store it. A subject with no
    /// articles still yields (and stores) a zero-score result.
    pub async fn analyze_cancellable(
        &self,
        subject: &str,
        options: &AnalyzeOptions,
        token: &CancellationToken,
    ) -> Result<AnalysisResult> {
        let subject = subject.trim();
        let people = if options.include_individuals {
            self.roster.people(subject).await.unwrap_or_else(|e| {
                warn!(subject, error = %e, "analysis: roster lookup failed");
                Vec::new()
            })
        } else {
            Vec::new()
        };

        let plan = query_plan(subject, &people, &self.lexicon);
        let cap = options.detail_level.article_cap();
        let per_query = (cap / plan.len()).max(1);
        let range = options.date_range_years.to_date_range();
        info!(subject, queries = plan.len(), cap, per_query, "analysis: starting");

        let mut articles: Vec<Article> = Vec::new();
        for terms in &plan {
            let query = SearchQuery::new(terms.clone())
                .with_date_range(range)
                .with_limit(per_query);
            match self.archive.search_cancellable(&query, token).await {
                Ok(found) => {
                    for article in found {
                        if !articles.iter().any(|a| a.url == article.url) {
                            articles.push(article);
                        }
                    }
                }
                Err(RelwatchError::Cancelled) => return Err(RelwatchError::Cancelled),
                Err(e) => warn!(query = %terms, error = %e, "analysis: search failed"),
            }
        }
        articles.truncate(cap);

        for article in articles.iter_mut().filter(|a| !a.has_body()) {
            match self
                .archive
                .ensure_body_cancellable(article.clone(), token)
                .await
            {
                Ok(filled) => *article = filled,
                Err(RelwatchError::Cancelled) => return Err(RelwatchError::Cancelled),
                Err(e) => warn!(url = %article.url, error = %e, "analysis: body fetch failed"),
            }
        }

        let result = build_analysis(subject, &articles, &people, &self.lexicon);
        info!(
            subject,
            articles = result.article_count,
            score = result.relation_score,
            "analysis: done"
        );

        if let Err(e) = self.store.save(result.clone()).await {
            warn!(subject, error = %e, "analysis: failed to store result");
        }
        Ok(result)
    }

    pub async fn get_analysis(&self, subject: &str) -> Option<AnalysisResult> {
        self.store.get(subject).await
    }

    /// Stored analysis for reporting; `NoData` when missing or empty.
    pub async fn require_analysis(&self, subject: &str) -> Result<AnalysisResult> {
        match self.store.get(subject).await {
            Some(result) if result.article_count > 0 => Ok(result),
            _ => Err(RelwatchError::NoData(subject.trim().to_string())),
        }
    }

    pub async fn list_analyses(&self, options: &ListOptions) -> Vec<AnalysisSummary> {
        select_analyses(self.store.all().await, options)
    }
}

/// Quoted subject, subject + each leading institution keyword, subject +
/// each leading party keyword, then three queries per roster individual.
pub fn query_plan(subject: &str, people: &[RosterEntry], lexicon: &Lexicon) -> Vec<String> {
    let quoted = format!("\"{subject}\"");
    let mut plan = vec![quoted.clone()];

    for keyword in lexicon
        .institution_keywords
        .iter()
        .take(SUBJECT_QUERY_KEYWORDS)
        .chain(lexicon.party_keywords.iter().take(SUBJECT_QUERY_KEYWORDS))
    {
        plan.push(format!("{quoted} {}", query_term(keyword)));
    }

    for person in people.iter().take(PERSON_QUERIES) {
        let name = format!("\"{}\"", person.name);
        plan.push(name.clone());
        plan.push(format!("{name} {}", any_of(&lexicon.institution_keywords)));
        plan.push(format!("{name} {}", any_of(&lexicon.party_keywords)));
    }

    plan
}

/// Multi-word keywords are quoted so they stay one phrase.
fn query_term(keyword: &Keyword) -> String {
    if keyword.label.contains(' ') {
        format!("\"{}\"", keyword.label)
    } else {
        keyword.label.clone()
    }
}

fn any_of(keywords: &[Keyword]) -> String {
    keywords
        .iter()
        .take(PERSON_QUERY_KEYWORDS)
        .map(query_term)
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// Metrics and insights for an article set, trimmed to [`TOP_N`] per list.
pub fn build_analysis(
    subject: &str,
    articles: &[Article],
    roster: &[RosterEntry],
    lexicon: &Lexicon,
) -> AnalysisResult {
    let mut result = AnalysisResult {
        id: Uuid::new_v4(),
        subject_name: subject.to_string(),
        relation_score: 0.0,
        article_count: articles.len(),
        summary_text: no_data_sentence(subject),
        key_events: Vec::new(),
        key_people: Vec::new(),
        institution_connections: Vec::new(),
        party_connections: Vec::new(),
        analyzed_at: Utc::now(),
    };
    if articles.is_empty() {
        return result;
    }

    let metrics = compute_metrics(articles, lexicon);
    result.relation_score = metrics.relation_score();
    result.key_events = top(key_events(articles, lexicon));
    result.key_people = top(key_people(articles, roster, lexicon));
    result.institution_connections = top(connections(
        articles,
        &lexicon.institution_entities,
        ConnectionCategory::Institution,
    ));
    result.party_connections = top(connections(
        articles,
        &lexicon.party_entities,
        ConnectionCategory::Party,
    ));
    result.summary_text = summary_text(subject, articles, &metrics);
    result
}

fn top<T>(mut items: Vec<T>) -> Vec<T> {
    items.truncate(TOP_N);
    items
}

// --- Listing ---

const HIGH_FILTERS: &[&str] = &["high relation", "yüksek ilişki"];
const MEDIUM_FILTERS: &[&str] = &["medium relation", "orta ilişki"];
const LOW_FILTERS: &[&str] = &["low relation", "düşük ilişki"];

/// Filter, sort and cap stored analyses into list rows.
pub fn select_analyses(mut analyses: Vec<AnalysisResult>, options: &ListOptions) -> Vec<AnalysisSummary> {
    if let Some(filter) = options.filter.as_deref().map(fold).filter(|f| !f.trim().is_empty()) {
        analyses.retain(|a| matches_filter(a, &filter));
    }

    match options.sort_by {
        SortBy::Name => analyses.sort_by_cached_key(|a| fold(&a.subject_name)),
        SortBy::RelationScore => {
            analyses.sort_by(|a, b| b.relation_score.total_cmp(&a.relation_score))
        }
        SortBy::ArticleCount => analyses.sort_by_key(|a| Reverse(a.article_count)),
        SortBy::LastAnalyzed => analyses.sort_by_key(|a| Reverse(a.analyzed_at)),
    }

    analyses
        .iter()
        .take(options.limit)
        .map(AnalysisSummary::from)
        .collect()
}

fn matches_filter(analysis: &AnalysisResult, folded_filter: &str) -> bool {
    let has = |phrases: &[&str]| phrases.iter().any(|p| folded_filter.contains(p));
    let score = analysis.relation_score;

    if has(HIGH_FILTERS) {
        score >= 7.0
    } else if has(MEDIUM_FILTERS) {
        (4.0..7.0).contains(&score)
    } else if has(LOW_FILTERS) {
        score < 4.0
    } else {
        fold(&analysis.subject_name).contains(folded_filter)
            || fold(&analysis.summary_text).contains(folded_filter)
    }
}
