use relwatch_common::{Article, RelationMetrics};

const HIGH_TIER: f64 = 0.7;
const MEDIUM_TIER: f64 = 0.4;
const SUMMARY_KEYWORDS: usize = 3;

/// Sentence used when an analysis found nothing to read.
pub fn no_data_sentence(subject: &str) -> String {
    format!("No news articles were found to analyze for {subject}.")
}

/// Plain-text overview of an analysis: relation tier, mention counts, top
/// keywords and the covered date span.
pub fn summary_text(subject: &str, articles: &[Article], metrics: &RelationMetrics) -> String {
    if articles.is_empty() {
        return no_data_sentence(subject);
    }

    let mut out = String::new();
    if metrics.score >= HIGH_TIER {
        out.push_str(&format!(
            "{subject} appears to have a high level of relation with the government and the ruling party. "
        ));
    } else if metrics.score >= MEDIUM_TIER {
        out.push_str(&format!(
            "{subject} shows a medium level of relation with the government and the ruling party. "
        ));
    } else {
        out.push_str(&format!(
            "{subject} appears to have a low level of relation with the government and the ruling party. "
        ));
    }

    out.push_str(&format!(
        "Across {} articles reviewed, {} government-related and {} party-related keyword mentions were found. ",
        articles.len(),
        metrics.institution_mention_count,
        metrics.party_mention_count,
    ));

    if !metrics.top_keywords.is_empty() {
        let top: Vec<String> = metrics
            .top_keywords
            .iter()
            .take(SUMMARY_KEYWORDS)
            .map(|k| format!("{} ({})", k.keyword, k.count))
            .collect();
        out.push_str(&format!("Most frequent keywords: {}. ", top.join(", ")));
    }

    let dates = articles.iter().filter_map(|a| a.published_date);
    if let (Some(first), Some(last)) = (dates.clone().min(), dates.max()) {
        out.push_str(&format!("The articles span {first} to {last}."));
    }

    out.trim_end().to_string()
}
