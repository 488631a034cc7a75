// JSON-document corpus store. One file holds every article plus metadata;
// every mutation is flushed (temp file + rename) before the write lock drops.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use relwatch_common::persist::{self, DocumentMetadata};
use relwatch_common::{fold, Article, Result, SearchQuery};

use crate::terms::QueryTerms;
use crate::traits::{CorpusStore, Upserted};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusDocument {
    #[serde(default)]
    pub articles: Vec<Article>,
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

struct Corpus {
    doc: CorpusDocument,
    by_url: HashMap<String, usize>,
}

impl Corpus {
    fn new(doc: CorpusDocument) -> Self {
        let by_url = doc
            .articles
            .iter()
            .enumerate()
            .map(|(i, a)| (a.url.clone(), i))
            .collect();
        Self { doc, by_url }
    }
}

pub struct JsonCorpusStore {
    path: PathBuf,
    corpus: RwLock<Corpus>,
}

impl JsonCorpusStore {
    /// Load the corpus at `path`, creating an empty document if missing.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let doc: CorpusDocument = persist::load_or_default(&path).await?;
        if !path.exists() {
            persist::save_atomic(&path, &doc).await?;
        }
        info!(path = %path.display(), articles = doc.articles.len(), "Corpus loaded");

        Ok(Self {
            path,
            corpus: RwLock::new(Corpus::new(doc)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CorpusStore for JsonCorpusStore {
    async fn find_by_query(&self, query: &SearchQuery) -> Result<Vec<Article>> {
        let terms = QueryTerms::parse(&query.terms);
        let corpus = self.corpus.read().await;

        let mut hits: Vec<&Article> = corpus
            .doc
            .articles
            .iter()
            .filter(|a| query.accepts_source(&a.source))
            .filter(|a| query.accepts_date(a.published_date))
            .filter(|a| terms.is_empty() || terms.matches(&fold(&a.searchable_text())))
            .collect();

        // Newest first; unknown dates last.
        hits.sort_by_key(|a| Reverse(a.published_date));
        hits.truncate(query.limit);

        debug!(terms = %query.terms, hits = hits.len(), "Corpus lookup");
        Ok(hits.into_iter().cloned().collect())
    }

    async fn upsert(&self, mut article: Article) -> Result<Upserted> {
        let mut corpus = self.corpus.write().await;
        let now = Utc::now();

        let outcome = match corpus.by_url.get(&article.url).copied() {
            Some(idx) => {
                let previous = corpus.doc.articles[idx].clone();
                corpus.doc.articles[idx].merge_from(article);
                corpus.doc.articles[idx].updated_at = Some(now);
                let previous_updated = std::mem::replace(&mut corpus.doc.metadata.last_updated, now);

                if let Err(e) = persist::save_atomic(&self.path, &corpus.doc).await {
                    corpus.doc.articles[idx] = previous;
                    corpus.doc.metadata.last_updated = previous_updated;
                    return Err(e);
                }
                Upserted::Updated
            }
            None => {
                article.created_at.get_or_insert(now);
                article.updated_at = Some(now);
                let url = article.url.clone();
                corpus.doc.articles.push(article);
                corpus.doc.metadata.total_count += 1;
                let previous_updated = std::mem::replace(&mut corpus.doc.metadata.last_updated, now);

                if let Err(e) = persist::save_atomic(&self.path, &corpus.doc).await {
                    corpus.doc.articles.pop();
                    corpus.doc.metadata.total_count -= 1;
                    corpus.doc.metadata.last_updated = previous_updated;
                    return Err(e);
                }
                let idx = corpus.doc.articles.len() - 1;
                corpus.by_url.insert(url, idx);
                Upserted::Inserted
            }
        };

        Ok(outcome)
    }

    async fn get(&self, url: &str) -> Result<Option<Article>> {
        let corpus = self.corpus.read().await;
        Ok(corpus
            .by_url
            .get(url)
            .map(|&idx| corpus.doc.articles[idx].clone()))
    }

    async fn total_count(&self) -> Result<usize> {
        Ok(self.corpus.read().await.doc.metadata.total_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use relwatch_common::DateRange;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    async fn seeded(dir: &Path) -> JsonCorpusStore {
        let store = JsonCorpusStore::open(dir.join("corpus.json")).await.unwrap();
        let articles = [
            Article::new("https://a.example/1", "Acme ihale kazandı", "Sabah")
                .with_date(ymd(2020, 1, 15))
                .with_summary("Bakanlık onayı"),
            Article::new("https://a.example/2", "Acme yeni fabrika", "T24").with_date(ymd(2021, 6, 1)),
            Article::new("https://a.example/3", "Başka şirket", "Sabah").with_date(ymd(2022, 3, 3)),
            Article::new("https://a.example/4", "ACME tarihsiz", "Sabah"),
        ];
        for a in articles {
            store.upsert(a).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn finds_by_all_terms_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded(dir.path()).await;

        let hits = store.find_by_query(&SearchQuery::new("acme")).await.unwrap();
        let urls: Vec<_> = hits.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls, ["https://a.example/2", "https://a.example/1", "https://a.example/4"]);

        let hits = store.find_by_query(&SearchQuery::new("acme bakanlık")).await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn filters_by_source_and_date_range() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded(dir.path()).await;

        let query = SearchQuery::new("acme")
            .with_sources(vec!["sabah".into()])
            .with_date_range(DateRange::new(ymd(2019, 1, 1), ymd(2020, 12, 31)));
        let hits = store.find_by_query(&query).await.unwrap();
        let urls: Vec<_> = hits.iter().map(|a| a.url.as_str()).collect();
        // Undated articles are never excluded by a range.
        assert_eq!(urls, ["https://a.example/1", "https://a.example/4"]);
    }

    #[tokio::test]
    async fn blank_terms_return_everything_up_to_limit() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded(dir.path()).await;
        let hits = store.find_by_query(&SearchQuery::new("").with_limit(2)).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn upsert_is_idempotent_and_merges() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded(dir.path()).await;
        assert_eq!(store.total_count().await.unwrap(), 4);

        let again = Article::new("https://a.example/1", "Acme ihale kazandı", "Sabah");
        assert_eq!(store.upsert(again.clone()).await.unwrap(), Upserted::Updated);
        assert_eq!(store.upsert(again).await.unwrap(), Upserted::Updated);
        assert_eq!(store.total_count().await.unwrap(), 4);

        let filled = Article::new("https://a.example/1", "", "").with_body("Tam metin");
        store.upsert(filled).await.unwrap();
        let stored = store.get("https://a.example/1").await.unwrap().unwrap();
        assert_eq!(stored.title, "Acme ihale kazandı");
        assert_eq!(stored.summary, "Bakanlık onayı");
        assert_eq!(stored.body.as_deref(), Some("Tam metin"));
        assert!(stored.updated_at.is_some());
    }

    #[tokio::test]
    async fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            seeded(dir.path()).await;
        }
        let reopened = JsonCorpusStore::open(dir.path().join("corpus.json")).await.unwrap();
        assert_eq!(reopened.total_count().await.unwrap(), 4);
        assert!(reopened.get("https://a.example/3").await.unwrap().is_some());

        let raw = std::fs::read_to_string(dir.path().join("corpus.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["metadata"]["totalCount"], 4);
        assert_eq!(json["articles"][0]["publishedDate"], "2020-01-15");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_upserts_of_one_url_store_it_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.json");
        let store = std::sync::Arc::new(JsonCorpusStore::open(&path).await.unwrap());

        let writers: Vec<_> = (0..8)
            .map(|n| {
                let store = store.clone();
                tokio::spawn(async move {
                    let article = Article::new("https://a.example/same", format!("Acme {n}"), "Sabah")
                        .with_body(format!("gövde {n}"));
                    store.upsert(article).await
                })
            })
            .collect();
        let mut inserted = 0;
        for writer in writers {
            if writer.await.unwrap().unwrap() == Upserted::Inserted {
                inserted += 1;
            }
        }

        assert_eq!(inserted, 1);
        assert_eq!(store.total_count().await.unwrap(), 1);
        let reopened = JsonCorpusStore::open(&path).await.unwrap();
        assert_eq!(reopened.total_count().await.unwrap(), 1);
        let raw = std::fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["articles"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_flush_leaves_memory_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonCorpusStore::open(dir.path().join("corpus.json")).await.unwrap();
        // Block the rename target: a directory where the document should go.
        std::fs::remove_file(dir.path().join("corpus.json")).unwrap();
        std::fs::create_dir(dir.path().join("corpus.json")).unwrap();

        let err = store
            .upsert(Article::new("https://a.example/x", "x", "Sabah"))
            .await
            .unwrap_err();
        assert!(matches!(err, relwatch_common::RelwatchError::Persistence(_)));
        assert_eq!(store.total_count().await.unwrap(), 0);
        assert!(store.get("https://a.example/x").await.unwrap().is_none());
    }
}
