//! Durable JSON documents: load-or-init and temp-file-then-rename saves.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::error::Result;

/// `metadata` block shared by the corpus and analysis documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub last_updated: DateTime<Utc>,
    pub total_count: usize,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self {
            last_updated: Utc::now(),
            total_count: 0,
        }
    }
}

/// Read `path`, or return `T::default()` when the file does not exist yet.
pub async fn load_or_default<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(e.into()),
    }
}

/// Write `value` next to `path`, sync it to disk and rename it into place,
/// so readers see either the old document or the new one.
pub async fn save_atomic<T>(path: &Path, value: &T) -> Result<()>
where
    T: Serialize,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let bytes = serde_json::to_vec_pretty(value)?;
    let tmp = temp_path(path);
    if let Err(e) = write_synced(&tmp, &bytes).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Doc {
        items: Vec<String>,
        metadata: DocumentMetadata,
    }

    #[tokio::test]
    async fn missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let doc: Doc = load_or_default(&dir.path().join("nope.json")).await.unwrap();
        assert!(doc.items.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/doc.json");
        let doc = Doc {
            items: vec!["a".into()],
            metadata: DocumentMetadata::default(),
        };
        save_atomic(&path, &doc).await.unwrap();
        assert!(!dir.path().join("nested/doc.json.tmp").exists());

        let loaded: Doc = load_or_default(&path).await.unwrap();
        assert_eq!(loaded, doc);
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("lastUpdated"));
        assert!(raw.contains("totalCount"));
    }

    #[tokio::test]
    async fn save_replaces_document_despite_stale_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(dir.path().join("doc.json.tmp"), "half written").unwrap();

        for items in [vec!["a".to_string()], vec!["b".to_string(), "c".to_string()]] {
            let doc = Doc {
                items,
                metadata: DocumentMetadata::default(),
            };
            save_atomic(&path, &doc).await.unwrap();
        }

        let loaded: Doc = load_or_default(&path).await.unwrap();
        assert_eq!(loaded.items, ["b", "c"]);
        assert!(!dir.path().join("doc.json.tmp").exists());
    }

    #[tokio::test]
    async fn corrupt_document_is_a_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_or_default::<Doc>(&path).await.unwrap_err();
        assert!(matches!(err, crate::RelwatchError::Persistence(_)));
    }
}
