// Selector-driven extraction from rendered news pages.

use scraper::{ElementRef, Html, Selector};
use spider_transformations::transformation::content::{
    transform_content_input, ReturnFormat, TransformConfig, TransformInput,
};
use url::Url;

use relwatch_common::{RelwatchError, Result, SourceConfig};

/// One row of a source's search-results list, before date normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub title: String,
    pub url: String,
    pub date_text: String,
    pub summary: String,
}

fn selector(source: &SourceConfig, css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| {
        RelwatchError::Config(format!("source '{}' has bad selector '{css}': {e}", source.key))
    })
}

/// Collapsed, trimmed text content of an element.
fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Pull result rows out of a search page using the source's selectors.
/// Rows without a title link are skipped; relative hrefs resolve against
/// the source's base URL.
pub fn search_results(html: &str, source: &SourceConfig) -> Result<Vec<ResultRow>> {
    let sel = &source.selectors;
    let list = selector(source, &sel.result_list)?;
    let title = selector(source, &sel.title)?;
    let date = selector(source, &sel.date)?;
    let summary = selector(source, &sel.summary)?;
    let base = Url::parse(&source.base_url)
        .map_err(|e| RelwatchError::Config(format!("source '{}' base_url: {e}", source.key)))?;

    let document = Html::parse_document(html);
    let rows = document
        .select(&list)
        .filter_map(|item| {
            let link = item.select(&title).next()?;
            let href = link.value().attr("href")?.trim();
            let url = base.join(href).ok()?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return None;
            }
            let title_text = text_of(link);
            if title_text.is_empty() {
                return None;
            }
            Some(ResultRow {
                title: title_text,
                url: url.to_string(),
                date_text: item.select(&date).next().map(text_of).unwrap_or_default(),
                summary: item.select(&summary).next().map(text_of).unwrap_or_default(),
            })
        })
        .collect();

    Ok(rows)
}

/// Text of every element matching the source's content selector, joined
/// with paragraph breaks. `None` when nothing non-empty matched.
pub fn article_text(html: &str, source: &SourceConfig) -> Result<Option<String>> {
    let content = selector(source, &source.selectors.content)?;
    let document = Html::parse_document(html);
    let paragraphs: Vec<String> = document
        .select(&content)
        .map(text_of)
        .filter(|p| !p.is_empty())
        .collect();

    Ok((!paragraphs.is_empty()).then(|| paragraphs.join("\n\n")))
}

/// Readability pass over a whole page, for layouts the content selector misses.
pub fn readable_markdown(html: &str, url: &str) -> String {
    let parsed_url = Url::parse(url).ok();
    let config = TransformConfig {
        readability: true,
        main_content: true,
        return_format: ReturnFormat::Markdown,
        filter_images: true,
        filter_svg: true,
        clean_html: true,
    };
    let input = TransformInput {
        url: parsed_url.as_ref(),
        content: html.as_bytes(),
        screenshot_bytes: None,
        encoding: None,
        selector_config: None,
        ignore_tags: None,
    };

    transform_content_input(input, &config).trim().to_string()
}

/// First markdown paragraph (plus the next when the first is short),
/// capped at `max_chars` with a trailing `...`.
pub fn summarize(markdown: &str, max_chars: usize) -> String {
    let mut paragraphs = paragraphs(markdown).into_iter();

    let Some(mut summary) = paragraphs.next() else {
        return String::new();
    };
    if summary.chars().count() < 100 {
        if let Some(second) = paragraphs.next() {
            summary.push(' ');
            summary.push_str(&second);
        }
    }
    truncate_chars(&summary, max_chars)
}

/// Blocks of text separated by blank (or whitespace-only) lines.
pub fn paragraphs(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                out.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        out.push(current.join("\n"));
    }
    out
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use relwatch_common::SourceRegistry;

    fn hurriyet() -> SourceConfig {
        SourceRegistry::turkish_defaults()
            .by_name("hurriyet")
            .cloned()
            .unwrap()
    }

    const RESULTS: &str = r#"
        <html><body><div class="searchResults">
          <div class="item">
            <h3 class="title"><a href="/ekonomi/acme-ihale-41234">Acme  ihale
              kazandı</a></h3>
            <span class="date">15.01.2020</span>
            <p class="spot">Bakanlık onayladı.</p>
          </div>
          <div class="item">
            <h3 class="title"><a href="https://www.hurriyet.com.tr/gundem/acme-2">Acme yatırım</a></h3>
          </div>
          <div class="item"><h3 class="title">no link</h3></div>
          <div class="item"><h3 class="title"><a href="javascript:void(0)">bad</a></h3></div>
        </div></body></html>"#;

    #[test]
    fn extracts_rows_and_resolves_links() {
        let rows = search_results(RESULTS, &hurriyet()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].title, "Acme ihale kazandı");
        assert_eq!(rows[0].url, "https://www.hurriyet.com.tr/ekonomi/acme-ihale-41234");
        assert_eq!(rows[0].date_text, "15.01.2020");
        assert_eq!(rows[0].summary, "Bakanlık onayladı.");
        assert_eq!(rows[1].date_text, "");
    }

    #[test]
    fn article_paragraphs_join_with_blank_lines() {
        let html = r#"<div class="news-content"><p>Birinci.</p><p> </p><p>İkinci.</p></div>"#;
        assert_eq!(
            article_text(html, &hurriyet()).unwrap().as_deref(),
            Some("Birinci.\n\nİkinci.")
        );
        assert_eq!(article_text("<p>elsewhere</p>", &hurriyet()).unwrap(), None);
    }

    #[test]
    fn bad_selector_is_a_config_error() {
        let mut source = hurriyet();
        source.selectors.result_list = "div[[".into();
        assert!(matches!(search_results("", &source), Err(RelwatchError::Config(_))));
    }

    #[test]
    fn summary_takes_second_paragraph_when_first_is_short() {
        let md = "Kısa giriş.\n\nİkinci paragraf burada.\n\nÜçüncü.";
        assert_eq!(summarize(md, 200), "Kısa giriş. İkinci paragraf burada.");
        assert_eq!(summarize("", 200), "");
        assert_eq!(paragraphs("a\n  \nb\nc\n\n\n"), ["a", "b\nc"]);
    }

    #[test]
    fn summary_truncates_by_characters() {
        let long = "ş".repeat(250);
        let s = summarize(&long, 200);
        assert_eq!(s.chars().count(), 200);
        assert!(s.ends_with("..."));
    }
}
