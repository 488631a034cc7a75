use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RelwatchError;

// --- Articles ---

/// One retrieved news document. `url` is the identity key in the corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    /// Display name of the publisher, e.g. "Hürriyet".
    pub source: String,
    /// `None` when the source date could not be normalized.
    pub published_date: Option<NaiveDate>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub fetched: bool,
    #[serde(default)]
    pub fetched_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Article {
    pub fn new(url: impl Into<String>, title: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: url.into(),
            title: title.into(),
            source: source.into(),
            published_date: None,
            summary: String::new(),
            body: None,
            fetched: false,
            fetched_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_date(mut self, date: Option<NaiveDate>) -> Self {
        self.published_date = date;
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Non-empty body text, if any.
    pub fn body_text(&self) -> Option<&str> {
        self.body.as_deref().filter(|b| !b.trim().is_empty())
    }

    pub fn has_body(&self) -> bool {
        self.body_text().is_some()
    }

    /// title + body + summary, the text every matcher and counter works on.
    pub fn searchable_text(&self) -> String {
        format!(
            "{} {} {}",
            self.title,
            self.body.as_deref().unwrap_or_default(),
            self.summary
        )
    }

    /// Field-by-field merge: non-empty values from `newer` win, empty ones
    /// never overwrite existing data. Identity (`id`, `url`, `created_at`) is kept.
    pub fn merge_from(&mut self, newer: Article) {
        let has_body = newer.body_text().is_some();
        if !newer.title.trim().is_empty() {
            self.title = newer.title;
        }
        if !newer.source.trim().is_empty() {
            self.source = newer.source;
        }
        if newer.published_date.is_some() {
            self.published_date = newer.published_date;
        }
        if !newer.summary.trim().is_empty() {
            self.summary = newer.summary;
        }
        if has_body {
            self.body = newer.body;
        }
        if newer.fetched {
            self.fetched = true;
        }
        if newer.fetched_at.is_some() {
            self.fetched_at = newer.fetched_at;
        }
    }
}

// --- Queries ---

/// Inclusive calendar-date bounds. Either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    /// Unknown dates are never excluded: a missing date is not evidence
    /// that the article falls outside the range.
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        let Some(date) = date else {
            return true;
        };
        if let Some(from) = self.from {
            if date < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if date > to {
                return false;
            }
        }
        true
    }
}

pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Ephemeral search request. Not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub terms: String,
    /// Source display names; empty means every registered source.
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub date_range: Option<DateRange>,
    pub limit: usize,
}

impl SearchQuery {
    pub fn new(terms: impl Into<String>) -> Self {
        Self {
            terms: terms.into(),
            sources: Vec::new(),
            date_range: None,
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn accepts_source(&self, source: &str) -> bool {
        self.sources.is_empty()
            || self
                .sources
                .iter()
                .any(|s| crate::lexicon::fold(s) == crate::lexicon::fold(source))
    }

    pub fn accepts_date(&self, date: Option<NaiveDate>) -> bool {
        self.date_range.map_or(true, |r| r.contains(date))
    }
}

// --- Scoring ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

/// Keyword-frequency metrics derived from an article set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelationMetrics {
    pub institution_mention_count: usize,
    pub party_mention_count: usize,
    /// Token count after stopword removal.
    pub total_word_count: usize,
    /// Normalized to [0, 1].
    pub score: f64,
    /// Descending by count.
    pub top_keywords: Vec<KeywordCount>,
}

impl RelationMetrics {
    /// 0–10 scale, one decimal place.
    pub fn relation_score(&self) -> f64 {
        ((self.score * 10.0 * 10.0).round() / 10.0).clamp(0.0, 10.0)
    }
}

// --- Analysis ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum RelationTier {
    High,
    Medium,
    Low,
}

impl RelationTier {
    pub fn from_mentions(count: usize) -> Self {
        if count > 5 {
            RelationTier::High
        } else if count > 2 {
            RelationTier::Medium
        } else {
            RelationTier::Low
        }
    }
}

impl fmt::Display for RelationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationTier::High => write!(f, "High"),
            RelationTier::Medium => write!(f, "Medium"),
            RelationTier::Low => write!(f, "Low"),
        }
    }
}

impl FromStr for RelationTier {
    type Err = RelwatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(RelationTier::High),
            "medium" => Ok(RelationTier::Medium),
            "low" => Ok(RelationTier::Low),
            other => Err(RelwatchError::Config(format!("unknown relation tier '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KeyEvent {
    pub date: Option<NaiveDate>,
    pub title: String,
    pub description: String,
    pub source: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonMention {
    pub name: String,
    pub role: String,
    pub mention_count: usize,
    pub relation_tier: RelationTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionCategory {
    Institution,
    Party,
}

/// Minimal article reference carried by a connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ArticleRef {
    pub title: String,
    pub date: Option<NaiveDate>,
    pub url: String,
}

impl From<&Article> for ArticleRef {
    fn from(a: &Article) -> Self {
        Self {
            title: a.title.clone(),
            date: a.published_date,
            url: a.url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    pub entity_name: String,
    pub mention_count: usize,
    pub category: ConnectionCategory,
    /// Deduplicated by URL.
    pub supporting_articles: Vec<ArticleRef>,
}

/// One subject's analysis snapshot. Stored keyed by case-folded subject name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub id: Uuid,
    pub subject_name: String,
    pub relation_score: f64,
    pub article_count: usize,
    pub summary_text: String,
    pub key_events: Vec<KeyEvent>,
    pub key_people: Vec<PersonMention>,
    pub institution_connections: Vec<ConnectionRecord>,
    pub party_connections: Vec<ConnectionRecord>,
    pub analyzed_at: DateTime<Utc>,
}

/// Row returned by `list_analyses`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub name: String,
    pub relation_score: f64,
    pub article_count: usize,
    pub summary: String,
    pub last_analyzed: NaiveDate,
}

impl From<&AnalysisResult> for AnalysisSummary {
    fn from(r: &AnalysisResult) -> Self {
        Self {
            name: r.subject_name.clone(),
            relation_score: r.relation_score,
            article_count: r.article_count,
            summary: r.summary_text.clone(),
            last_analyzed: r.analyzed_at.date_naive(),
        }
    }
}

// --- Analysis options ---

/// Caps how many articles an analysis pulls in. Nothing else varies by level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DetailLevel {
    Basic,
    #[default]
    Detailed,
    Comprehensive,
}

impl DetailLevel {
    pub fn article_cap(self) -> usize {
        match self {
            DetailLevel::Basic => 10,
            DetailLevel::Detailed => 20,
            DetailLevel::Comprehensive => 30,
        }
    }
}

impl FromStr for DetailLevel {
    type Err = RelwatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(DetailLevel::Basic),
            "detailed" => Ok(DetailLevel::Detailed),
            "comprehensive" => Ok(DetailLevel::Comprehensive),
            other => Err(RelwatchError::Config(format!("unknown detail level '{other}'"))),
        }
    }
}

/// Inclusive year span used to bound analysis searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct YearRange {
    pub from: i32,
    pub to: i32,
}

pub const DEFAULT_FROM_YEAR: i32 = 2002;

impl Default for YearRange {
    fn default() -> Self {
        Self {
            from: DEFAULT_FROM_YEAR,
            to: Utc::now().year(),
        }
    }
}

impl YearRange {
    /// `from`-01-01 through `to`-12-31.
    pub fn to_date_range(self) -> DateRange {
        DateRange {
            from: NaiveDate::from_ymd_opt(self.from, 1, 1),
            to: NaiveDate::from_ymd_opt(self.to, 12, 31),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeOptions {
    pub date_range_years: YearRange,
    pub include_individuals: bool,
    pub detail_level: DetailLevel,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            date_range_years: YearRange::default(),
            include_individuals: true,
            detail_level: DetailLevel::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    Name,
    RelationScore,
    ArticleCount,
    LastAnalyzed,
}

impl FromStr for SortBy {
    type Err = RelwatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(SortBy::Name),
            "relationScore" | "relation_score" | "score" => Ok(SortBy::RelationScore),
            "articleCount" | "article_count" | "newsCount" => Ok(SortBy::ArticleCount),
            "lastAnalyzed" | "last_analyzed" => Ok(SortBy::LastAnalyzed),
            other => Err(RelwatchError::Config(format!("unknown sort key '{other}'"))),
        }
    }
}

pub const DEFAULT_LIST_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListOptions {
    pub filter: Option<String>,
    pub sort_by: SortBy,
    pub limit: usize,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            filter: None,
            sort_by: SortBy::default(),
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}
