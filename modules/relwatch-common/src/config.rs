use std::path::PathBuf;

use anyhow::Result;

pub const DEFAULT_BROWSERLESS_URL: &str = "http://localhost:3000";
pub const DEFAULT_FIRECRAWL_URL: &str = "https://api.firecrawl.dev";
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Application configuration loaded from environment variables.
/// Secrets and deployment-specific locations only; tunables, sources and
/// keyword tables live in the TOML [`FileConfig`](crate::FileConfig).
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Hosted search
    pub firecrawl_api_key: Option<String>,
    pub firecrawl_api_url: String,

    // Browser automation
    pub browserless_url: String,
    pub browserless_token: Option<String>,

    // Storage
    pub data_dir: PathBuf,

    /// Optional TOML file with retrieval settings, sources and lexicon.
    pub config_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            firecrawl_api_key: non_empty_var("FIRECRAWL_API_KEY"),
            firecrawl_api_url: non_empty_var("FIRECRAWL_API_URL")
                .unwrap_or_else(|| DEFAULT_FIRECRAWL_URL.to_string()),
            browserless_url: non_empty_var("BROWSERLESS_URL")
                .unwrap_or_else(|| DEFAULT_BROWSERLESS_URL.to_string()),
            browserless_token: non_empty_var("BROWSERLESS_TOKEN"),
            data_dir: non_empty_var("RELWATCH_DATA_DIR")
                .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
                .into(),
            config_path: non_empty_var("RELWATCH_CONFIG").map(PathBuf::from),
        };

        config.log_keys();
        Ok(config)
    }

    /// Location of the article corpus document.
    pub fn corpus_path(&self) -> PathBuf {
        self.data_dir.join("news-articles.json")
    }

    /// Location of the analysis document.
    pub fn analyses_path(&self) -> PathBuf {
        self.data_dir.join("analyses.json")
    }

    fn log_keys(&self) {
        fn preview(val: &str) -> String {
            let n = val.char_indices().nth(5).map(|(i, _)| i).unwrap_or(val.len());
            format!("{}...({} chars)", &val[..n], val.len())
        }
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) if !v.is_empty() => preview(v),
                _ => "<not set>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!("  FIRECRAWL_API_KEY: {}", preview_opt(&self.firecrawl_api_key));
        tracing::info!("  FIRECRAWL_API_URL: {}", self.firecrawl_api_url);
        tracing::info!("  BROWSERLESS_URL: {}", self.browserless_url);
        tracing::info!("  BROWSERLESS_TOKEN: {}", preview_opt(&self.browserless_token));
        tracing::info!("  RELWATCH_DATA_DIR: {}", self.data_dir.display());
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
