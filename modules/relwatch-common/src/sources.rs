//! Registry of news outlets the browser path knows how to drive.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::dates::DateFormat;
use crate::error::{RelwatchError, Result};
use crate::lexicon::fold;

/// CSS selectors for one outlet's search page and article page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Selectors {
    pub search_input: String,
    pub search_button: String,
    pub result_list: String,
    pub title: String,
    pub date: String,
    pub summary: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Short registry key, e.g. `hurriyet`.
    pub key: String,
    /// Display name stored on articles, e.g. `Hürriyet`.
    pub name: String,
    pub base_url: String,
    pub search_url: String,
    #[serde(default = "default_date_format")]
    pub date_format: DateFormat,
    pub selectors: Selectors,
}

fn default_date_format() -> DateFormat {
    DateFormat::DayMonthYearDotted
}

impl SourceConfig {
    pub fn hostname(&self) -> Option<String> {
        Url::parse(&self.base_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }
}

/// Ordered set of configured sources. Order matters: the browser fallback
/// walks the first N entries.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    sources: Vec<SourceConfig>,
}

impl SourceRegistry {
    pub fn new(sources: Vec<SourceConfig>) -> Result<Self> {
        for s in &sources {
            Url::parse(&s.base_url)
                .map_err(|e| RelwatchError::Config(format!("source '{}' base_url: {e}", s.key)))?;
            Url::parse(&s.search_url)
                .map_err(|e| RelwatchError::Config(format!("source '{}' search_url: {e}", s.key)))?;
        }
        Ok(Self { sources })
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceConfig> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Look up by display name or key, case-folded.
    pub fn by_name(&self, name: &str) -> Option<&SourceConfig> {
        let wanted = fold(name.trim());
        self.sources
            .iter()
            .find(|s| fold(&s.name) == wanted || fold(&s.key) == wanted)
    }

    /// Like [`by_name`](Self::by_name) but an unknown name is an error.
    pub fn require(&self, name: &str) -> Result<&SourceConfig> {
        self.by_name(name)
            .ok_or_else(|| RelwatchError::UnknownSource(name.to_string()))
    }

    /// Hostname for a source name, or the name itself when unknown.
    pub fn host_or_raw(&self, name: &str) -> String {
        self.by_name(name)
            .and_then(SourceConfig::hostname)
            .unwrap_or_else(|| name.trim().to_string())
    }

    /// The source whose hostname is contained in `host`.
    pub fn source_for_host(&self, host: &str) -> Option<&SourceConfig> {
        self.sources
            .iter()
            .find(|s| s.hostname().is_some_and(|h| host.contains(&h)))
    }

    /// Display name for an article URL: the registry name when its host
    /// matches a known outlet, otherwise the bare host.
    pub fn name_for_url(&self, url: &str) -> String {
        let host = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default();
        match self.source_for_host(&host) {
            Some(source) => source.name.clone(),
            None => host.trim_start_matches("www.").to_string(),
        }
    }

    /// The built-in Turkish outlets.
    pub fn turkish_defaults() -> Self {
        Self {
            sources: default_sources(),
        }
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::turkish_defaults()
    }
}

fn source(
    key: &str,
    name: &str,
    base: &str,
    search_path: &str,
    sel: [&str; 7],
) -> SourceConfig {
    let [search_input, search_button, result_list, title, date, summary, content] = sel;
    SourceConfig {
        key: key.into(),
        name: name.into(),
        base_url: base.into(),
        search_url: format!("{base}{search_path}"),
        date_format: DateFormat::DayMonthYearDotted,
        selectors: Selectors {
            search_input: search_input.into(),
            search_button: search_button.into(),
            result_list: result_list.into(),
            title: title.into(),
            date: date.into(),
            summary: summary.into(),
            content: content.into(),
        },
    }
}

fn default_sources() -> Vec<SourceConfig> {
    vec![
        source(
            "hurriyet",
            "Hürriyet",
            "https://www.hurriyet.com.tr",
            "/arama/",
            [
                r#"input[name="query"]"#,
                r#"button[type="submit"]"#,
                ".searchResults .item",
                "h3.title a",
                ".date",
                ".spot",
                ".news-content p",
            ],
        ),
        source(
            "milliyet",
            "Milliyet",
            "https://www.milliyet.com.tr",
            "/arama/",
            [
                "input#search",
                "button.searchButton",
                ".archive-list .list-item",
                "h3 a",
                ".date",
                ".spot",
                ".article-content p",
            ],
        ),
        source(
            "cumhuriyet",
            "Cumhuriyet",
            "https://www.cumhuriyet.com.tr",
            "/arama",
            [
                r#"input[name="query"]"#,
                "button.search-button",
                ".search-list .item",
                "h3.title a",
                ".date",
                ".summary",
                ".news-text p",
            ],
        ),
        source(
            "sabah",
            "Sabah",
            "https://www.sabah.com.tr",
            "/arama",
            [
                r#"input[name="q"]"#,
                "button.btn-search",
                ".search-results .result-item",
                "h3 a",
                ".date",
                ".summary",
                ".article-body p",
            ],
        ),
        source(
            "haberturk",
            "HaberTürk",
            "https://www.haberturk.com",
            "/arama",
            [
                r#"input[name="q"]"#,
                r#"button[type="submit"]"#,
                ".haberler .haber",
                "h2 a",
                ".date",
                ".spot",
                ".news-content p",
            ],
        ),
        source(
            "sozcu",
            "Sözcü",
            "https://www.sozcu.com.tr",
            "/arama/",
            [
                r#"input[name="s"]"#,
                r#"button[type="submit"]"#,
                ".news-list-item",
                "h3 a",
                ".date",
                ".spot",
                ".content p",
            ],
        ),
        source(
            "t24",
            "T24",
            "https://t24.com.tr",
            "/arama",
            [
                r#"input[name="q"]"#,
                "button.search-button",
                ".search-results .search-item",
                "h3 a",
                ".date",
                ".summary",
                ".article-body p",
            ],
        ),
        source(
            "dunya",
            "Dünya",
            "https://www.dunya.com",
            "/arama",
            [
                r#"input[name="word"]"#,
                "button.search-button",
                ".search-items .item",
                "h3 a",
                ".date",
                ".summary",
                ".article-content p",
            ],
        ),
        source(
            "bloomberght",
            "Bloomberg HT",
            "https://www.bloomberght.com",
            "/arama",
            [
                r#"input[name="q"]"#,
                r#"button[type="submit"]"#,
                ".search-item",
                "h3 a",
                ".date",
                ".summary",
                ".article-body p",
            ],
        ),
    ]
}
