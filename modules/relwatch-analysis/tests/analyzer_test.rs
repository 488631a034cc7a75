use std::sync::Arc;

use chrono::NaiveDate;
use tempfile::TempDir;

use relwatch_analysis::{Analyzer, JsonAnalysisStore, StaticRoster};
use relwatch_archive::testing::{test_registry, MockHostedSearch};
use relwatch_archive::{Archive, CorpusStore, JsonCorpusStore};
use relwatch_common::{
    AnalyzeOptions, Article, CancellationToken, DetailLevel, Lexicon, ListOptions, RelationTier,
    RelwatchError, RetrievalConfig, RosterEntry, SortBy, YearRange,
};

struct Fixture {
    _dir: TempDir,
    analyzer: Analyzer,
    hosted: Arc<MockHostedSearch>,
}

async fn fixture(seed: Vec<Article>, roster: Vec<RosterEntry>) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let corpus = JsonCorpusStore::open(dir.path().join("news-articles.json")).await.unwrap();
    for article in seed {
        corpus.upsert(article).await.unwrap();
    }

    let hosted = Arc::new(MockHostedSearch::new());
    let registry = Arc::new(test_registry(&[("test", "Test Haber", "test.example")]));
    let archive = Archive::new(Arc::new(corpus), registry, RetrievalConfig::default())
        .with_hosted(hosted.clone());
    let store = JsonAnalysisStore::open(dir.path().join("analyses.json")).await.unwrap();

    let analyzer = Analyzer::new(
        Arc::new(archive),
        Arc::new(store),
        Lexicon::shared_default(),
        Arc::new(StaticRoster::new(roster)),
    );
    Fixture {
        _dir: dir,
        analyzer,
        hosted,
    }
}

fn fetched(n: u32, body: &str) -> Article {
    let mut article = Article::new(format!("https://test.example/{n}"), "Acme", "Test Haber")
        .with_date(NaiveDate::from_ymd_opt(2020, n, 1))
        .with_body(body);
    article.fetched = true;
    article
}

fn filler(n: usize) -> String {
    vec!["şirket"; n].join(" ")
}

fn options(detail: DetailLevel) -> AnalyzeOptions {
    AnalyzeOptions {
        date_range_years: YearRange { from: 2015, to: 2024 },
        include_individuals: true,
        detail_level: detail,
    }
}

/// Three articles, "acme" in every title, one AKP and two hükümet mentions
/// across exactly 100 content words.
fn scored_corpus() -> Vec<Article> {
    vec![
        fetched(3, &format!("AKP {}", filler(31))),
        fetched(2, &format!("hükümet {}", filler(31))),
        fetched(1, &format!("hükümet {}", filler(32))),
    ]
}

#[tokio::test]
async fn end_to_end_score_from_keyword_density() {
    let f = fixture(scored_corpus(), Vec::new()).await;

    let result = f
        .analyzer
        .analyze("Acme", &options(DetailLevel::Comprehensive))
        .await
        .unwrap();

    assert_eq!(result.article_count, 3);
    assert!((result.relation_score - 4.0).abs() < 1e-9);
    assert!(result.summary_text.starts_with("Acme shows a medium level"));
    assert!(result.summary_text.contains("hükümet (2), akp (1)"));
    assert!(result.summary_text.ends_with("The articles span 2020-01-01 to 2020-03-01."));

    let events: Vec<_> = result.key_events.iter().map(|e| e.url.as_str()).collect();
    assert_eq!(
        events,
        ["https://test.example/3", "https://test.example/2", "https://test.example/1"]
    );
    assert!(result.key_events.iter().all(|e| e.description.chars().count() <= 200));

    assert_eq!(result.party_connections.len(), 1);
    assert_eq!(result.party_connections[0].entity_name, "AKP");
    assert!(result.institution_connections.is_empty());

    // Stored under a case-insensitive key.
    let stored = f.analyzer.get_analysis("ACME").await.unwrap();
    assert_eq!(stored.id, result.id);
}

#[tokio::test]
async fn empty_subject_yields_zero_result_without_error() {
    let f = fixture(Vec::new(), Vec::new()).await;

    let result = f
        .analyzer
        .analyze("Nobody Holding", &options(DetailLevel::Basic))
        .await
        .unwrap();

    assert_eq!(result.relation_score, 0.0);
    assert_eq!(result.article_count, 0);
    assert!(result.key_events.is_empty());
    assert!(result.summary_text.contains("No news articles were found"));
    // One hosted call per planned query.
    assert_eq!(f.hosted.search_calls(), 11);

    assert!(f.analyzer.get_analysis("nobody holding").await.is_some());
    let err = f.analyzer.require_analysis("Nobody Holding").await.unwrap_err();
    assert!(matches!(err, RelwatchError::NoData(_)));
}

#[tokio::test]
async fn missing_analysis_is_no_data() {
    let f = fixture(Vec::new(), Vec::new()).await;
    assert!(f.analyzer.get_analysis("Acme").await.is_none());
    assert!(matches!(
        f.analyzer.require_analysis("Acme").await,
        Err(RelwatchError::NoData(_))
    ));
}

#[tokio::test]
async fn roster_people_are_counted_and_searched() {
    let seed = vec![fetched(5, "Ayşe Kaya hükümet ile görüştü. Ayşe Kaya açıkladı.")];
    let roster = vec![RosterEntry {
        subject: "acme".into(),
        name: "Ayşe Kaya".into(),
        role: Some("CEO".into()),
        tier: Some(RelationTier::Medium),
    }];
    let f = fixture(seed, roster).await;

    let result = f
        .analyzer
        .analyze("Acme", &options(DetailLevel::Detailed))
        .await
        .unwrap();

    assert_eq!(result.key_people.len(), 1);
    assert_eq!(result.key_people[0].name, "Ayşe Kaya");
    assert_eq!(result.key_people[0].mention_count, 2);
    assert_eq!(result.key_people[0].relation_tier, RelationTier::Medium);

    let (last_query, _) = f.hosted.last_query().unwrap();
    assert!(last_query.starts_with("\"Ayşe Kaya\" akp OR"));
}

#[tokio::test]
async fn individuals_can_be_left_out() {
    let roster = vec![RosterEntry {
        subject: "Acme".into(),
        name: "Ayşe Kaya".into(),
        role: None,
        tier: None,
    }];
    let f = fixture(vec![fetched(5, "Ayşe Kaya")], roster).await;

    let mut opts = options(DetailLevel::Basic);
    opts.include_individuals = false;
    let result = f.analyzer.analyze("Acme", &opts).await.unwrap();

    assert!(result.key_people.is_empty());
    assert_eq!(f.hosted.search_calls(), 10);
}

#[tokio::test]
async fn rerun_replaces_and_lists() {
    let f = fixture(scored_corpus(), Vec::new()).await;
    f.analyzer.analyze("Acme", &options(DetailLevel::Comprehensive)).await.unwrap();
    f.analyzer.analyze("acme", &options(DetailLevel::Comprehensive)).await.unwrap();
    f.analyzer.analyze("Boş Şirket", &options(DetailLevel::Basic)).await.unwrap();

    let rows = f
        .analyzer
        .list_analyses(&ListOptions {
            sort_by: SortBy::RelationScore,
            ..Default::default()
        })
        .await;
    let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["acme", "Boş Şirket"]);

    let medium = f
        .analyzer
        .list_analyses(&ListOptions {
            filter: Some("medium relation".into()),
            ..Default::default()
        })
        .await;
    assert_eq!(medium.len(), 1);
}

#[tokio::test]
async fn cancelled_analysis_stores_nothing() {
    let f = fixture(scored_corpus(), Vec::new()).await;
    let token = CancellationToken::new();
    token.cancel();

    let err = f
        .analyzer
        .analyze_cancellable("Acme", &options(DetailLevel::Basic), &token)
        .await
        .unwrap_err();

    assert!(matches!(err, RelwatchError::Cancelled));
    assert!(f.analyzer.get_analysis("Acme").await.is_none());
}
