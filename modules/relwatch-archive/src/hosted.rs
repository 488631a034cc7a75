// Hosted-provider query strings and hit → Article mapping.

use chrono::Utc;

use relwatch_common::{extract_date, Article, SearchQuery, SourceRegistry};

use crate::extract::{summarize, truncate_chars};
use crate::traits::HostedHit;

pub const UNTITLED: &str = "Untitled article";
const SUMMARY_CHARS: usize = 200;

/// `{terms} site:a OR site:b after:YYYY-MM-DD before:YYYY-MM-DD lang:xx`.
///
/// Named sources map to their registry hostname (unknown names pass through
/// as-is); with no source filter every registered host is included.
pub fn provider_query(query: &SearchQuery, registry: &SourceRegistry, language: &str) -> String {
    let mut parts = vec![query.terms.trim().to_string()];

    let hosts: Vec<String> = if query.sources.is_empty() {
        registry.iter().filter_map(|s| s.hostname()).collect()
    } else {
        query.sources.iter().map(|name| registry.host_or_raw(name)).collect()
    };
    if !hosts.is_empty() {
        let sites: Vec<String> = hosts.iter().map(|h| format!("site:{h}")).collect();
        parts.push(sites.join(" OR "));
    }

    if let Some(range) = query.date_range {
        if let Some(from) = range.from {
            parts.push(format!("after:{}", from.format("%Y-%m-%d")));
        }
        if let Some(to) = range.to {
            parts.push(format!("before:{}", to.format("%Y-%m-%d")));
        }
    }

    if !language.is_empty() {
        parts.push(format!("lang:{language}"));
    }

    parts.retain(|p| !p.is_empty());
    parts.join(" ")
}

/// Map a provider hit to an article. Hits without a URL are dropped.
pub fn article_from_hit(hit: HostedHit, registry: &SourceRegistry) -> Option<Article> {
    let url = hit.url.trim().to_string();
    if url.is_empty() {
        return None;
    }

    let title = hit
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| UNTITLED.to_string());
    let markdown = hit.markdown.filter(|m| !m.trim().is_empty());
    let summary = match hit.description.filter(|d| !d.trim().is_empty()) {
        Some(description) => truncate_chars(description.trim(), SUMMARY_CHARS),
        None => markdown
            .as_deref()
            .map(|m| summarize(m, SUMMARY_CHARS))
            .unwrap_or_default(),
    };

    let source = registry.name_for_url(&url);
    let mut article = Article::new(url, title, source)
        .with_date(markdown.as_deref().and_then(extract_date))
        .with_summary(summary);

    if let Some(body) = markdown {
        article.body = Some(body);
        article.fetched = true;
        article.fetched_at = Some(Utc::now());
    }
    Some(article)
}
