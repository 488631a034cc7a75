// JSON-document analysis store, keyed by case-folded subject name.
// A rerun for the same subject replaces the stored snapshot.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use relwatch_archive::Upserted;
use relwatch_common::persist::{self, DocumentMetadata};
use relwatch_common::{fold, AnalysisResult, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisDocument {
    #[serde(default)]
    pub analyses: Vec<AnalysisResult>,
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

pub struct JsonAnalysisStore {
    path: PathBuf,
    doc: RwLock<AnalysisDocument>,
}

impl JsonAnalysisStore {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let doc: AnalysisDocument = persist::load_or_default(&path).await?;
        info!(path = %path.display(), analyses = doc.analyses.len(), "Analysis store loaded");
        Ok(Self {
            path,
            doc: RwLock::new(doc),
        })
    }

    pub async fn get(&self, subject: &str) -> Option<AnalysisResult> {
        let key = fold(subject.trim());
        let doc = self.doc.read().await;
        doc.analyses
            .iter()
            .find(|a| fold(&a.subject_name) == key)
            .cloned()
    }

    pub async fn all(&self) -> Vec<AnalysisResult> {
        self.doc.read().await.analyses.clone()
    }

    /// Insert or replace the snapshot for `result.subject_name`. The file is
    /// flushed before the in-memory document changes.
    pub async fn save(&self, result: AnalysisResult) -> Result<Upserted> {
        let mut doc = self.doc.write().await;
        let key = fold(&result.subject_name);

        let mut next = doc.clone();
        let outcome = match next.analyses.iter().position(|a| fold(&a.subject_name) == key) {
            Some(idx) => {
                next.analyses[idx] = result;
                Upserted::Updated
            }
            None => {
                next.analyses.push(result);
                next.metadata.total_count += 1;
                Upserted::Inserted
            }
        };
        next.metadata.last_updated = Utc::now();

        persist::save_atomic(&self.path, &next).await?;
        *doc = next;
        Ok(outcome)
    }
}
