use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::lexicon::{Lexicon, LexiconConfig};
use crate::sources::{SourceConfig, SourceRegistry};
use crate::types::RelationTier;

/// TOML-backed configuration loaded from disk.
/// Secrets stay as env vars. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Replaces the built-in outlet registry when present.
    #[serde(default)]
    pub sources: Option<Vec<SourceConfig>>,
    #[serde(default)]
    pub lexicon: LexiconConfig,
    #[serde(default)]
    pub roster: Vec<RosterEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// How many registry sources the browser fallback tries without a filter.
    pub default_browser_sources: usize,
    /// Concurrent browser sessions. 1 keeps the fallback strictly sequential.
    pub browser_concurrency: usize,
    pub navigation_timeout_ms: u64,
    pub wait_timeout_ms: u64,
    pub request_timeout_secs: u64,
    /// Language tag passed to the hosted search provider.
    pub language: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_browser_sources: 3,
            browser_concurrency: 1,
            navigation_timeout_ms: 30_000,
            wait_timeout_ms: 10_000,
            request_timeout_secs: 60,
            language: "tr".to_string(),
        }
    }
}

/// One individual affiliated with a subject.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterEntry {
    pub subject: String,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    /// Overrides the default `Low` tier for affiliated individuals.
    #[serde(default)]
    pub tier: Option<RelationTier>,
}

impl FileConfig {
    pub fn registry(&self) -> Result<SourceRegistry> {
        match &self.sources {
            Some(sources) => SourceRegistry::new(sources.clone()).context("Invalid [[sources]] entry"),
            None => Ok(SourceRegistry::turkish_defaults()),
        }
    }

    pub fn lexicon(&self) -> Result<Arc<Lexicon>> {
        let unchanged = self.lexicon.institution_keywords.is_none()
            && self.lexicon.party_keywords.is_none()
            && self.lexicon.stopwords.is_none()
            && self.lexicon.politicians.is_none()
            && self.lexicon.institution_entities.is_none()
            && self.lexicon.party_entities.is_none();
        if unchanged {
            return Ok(Lexicon::shared_default());
        }
        let lexicon = Lexicon::from_config(&self.lexicon).context("Invalid [lexicon] section")?;
        Ok(Arc::new(lexicon))
    }
}

/// Load and parse a TOML config file.
pub fn load_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: FileConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}

/// Load `path` when given, otherwise fall back to built-in defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<FileConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(FileConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_yields_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.retrieval, RetrievalConfig::default());
        assert_eq!(config.registry().unwrap().len(), 9);
        assert!(config.roster.is_empty());
    }

    #[test]
    fn parses_sections() {
        let raw = r#"
            [retrieval]
            default_browser_sources = 2
            browser_concurrency = 3

            [[sources]]
            key = "gazete"
            name = "Gazete"
            base_url = "https://gazete.example"
            search_url = "https://gazete.example/ara"
            date_format = "DD/MM/YYYY"
            [sources.selectors]
            search_input = "input"
            search_button = "button"
            result_list = "li"
            title = "a"
            date = ".d"
            summary = ".s"
            content = "article p"

            [lexicon]
            party_keywords = ["akp"]

            [[roster]]
            subject = "Acme Holding"
            name = "Ali Veli"
            role = "CEO"
            tier = "High"
        "#;
        let config: FileConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.retrieval.default_browser_sources, 2);
        assert_eq!(config.retrieval.wait_timeout_ms, 10_000);

        let registry = config.registry().unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.by_name("gazete").unwrap().search_url, "https://gazete.example/ara");

        assert_eq!(config.lexicon().unwrap().party_keywords.len(), 1);
        assert_eq!(config.roster[0].tier, Some(RelationTier::High));
    }

    #[test]
    fn rejects_unknown_sections() {
        assert!(toml::from_str::<FileConfig>("[server]\nport = 1").is_err());
    }

    #[test]
    fn load_config_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[retrieval]\nlanguage = \"en\"").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.retrieval.language, "en");

        let err = load_config(Path::new("/nonexistent/relwatch.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/relwatch.toml"));
    }

    #[test]
    fn example_config_parses() {
        let raw = include_str!("../../../config/relwatch.example.toml");
        let config: FileConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.retrieval, RetrievalConfig::default());
        assert_eq!(config.registry().unwrap().by_name("Hürriyet").unwrap().key, "hurriyet");
        assert_eq!(config.roster.len(), 2);
        assert_eq!(config.roster[1].tier, Some(RelationTier::Medium));
    }
}
