// Insight extraction: key events, key people and entity connections.
//
// Key events and connections use folded substring containment. Key people
// use the same whole-word counting as scoring.

use std::cmp::Reverse;

use tracing::warn;

use relwatch_archive::extract::{paragraphs, truncate_chars};
use relwatch_common::lexicon::Keyword;
use relwatch_common::{
    fold, Article, ArticleRef, ConnectionCategory, ConnectionRecord, KeyEvent, Lexicon,
    PersonMention, RelationTier, RosterEntry,
};

/// How many key-event candidates are collected before the caller trims.
pub const EVENT_CANDIDATES: usize = 10;
const DESCRIPTION_CHARS: usize = 200;

pub const POLITICIAN_ROLE: &str = "Politician/Bureaucrat";
pub const UNKNOWN_ROLE: &str = "Unknown";

/// Newest-first articles whose body (or summary) mentions any institution
/// or party keyword, up to [`EVENT_CANDIDATES`].
pub fn key_events(articles: &[Article], lexicon: &Lexicon) -> Vec<KeyEvent> {
    let mut sorted: Vec<&Article> = articles.iter().collect();
    sorted.sort_by_key(|a| Reverse(a.published_date));

    sorted
        .into_iter()
        .filter(|a| {
            let text = a.body_text().unwrap_or(a.summary.as_str());
            lexicon.mentions_any_keyword(&fold(text))
        })
        .take(EVENT_CANDIDATES)
        .map(|a| KeyEvent {
            date: a.published_date,
            title: a.title.clone(),
            description: event_description(a),
            source: a.source.clone(),
            url: a.url.clone(),
        })
        .collect()
}

/// The summary, else the first body paragraph, else the title.
fn event_description(article: &Article) -> String {
    if !article.summary.trim().is_empty() {
        return article.summary.clone();
    }
    match article.body_text().and_then(|b| paragraphs(b).into_iter().next()) {
        Some(first) => truncate_chars(&first, DESCRIPTION_CHARS),
        None => article.title.clone(),
    }
}

/// Roster individuals mentioned at least once, then prominent politicians
/// not already listed, sorted by mention count.
pub fn key_people(articles: &[Article], roster: &[RosterEntry], lexicon: &Lexicon) -> Vec<PersonMention> {
    let text = articles
        .iter()
        .map(|a| fold(&a.searchable_text()))
        .collect::<Vec<_>>()
        .join(" ");

    let mut people: Vec<PersonMention> = Vec::new();

    for entry in roster {
        let keyword = match Keyword::new(&entry.name) {
            Ok(k) => k,
            Err(e) => {
                warn!(name = %entry.name, error = %e, "Skipping roster entry");
                continue;
            }
        };
        let count = keyword.count_in(&text);
        if count > 0 {
            people.push(PersonMention {
                name: entry.name.clone(),
                role: entry.role.clone().unwrap_or_else(|| UNKNOWN_ROLE.to_string()),
                mention_count: count,
                relation_tier: entry.tier.unwrap_or(RelationTier::Low),
            });
        }
    }

    for politician in &lexicon.politicians {
        let count = politician.count_in(&text);
        let listed = people.iter().any(|p| fold(&p.name) == politician.term);
        if count > 0 && !listed {
            people.push(PersonMention {
                name: politician.label.clone(),
                role: POLITICIAN_ROLE.to_string(),
                mention_count: count,
                relation_tier: RelationTier::from_mentions(count),
            });
        }
    }

    people.sort_by_key(|p| Reverse(p.mention_count));
    people
}

/// One record per entity found in any article, counting one per article.
pub fn connections(
    articles: &[Article],
    entities: &[String],
    category: ConnectionCategory,
) -> Vec<ConnectionRecord> {
    let folded: Vec<String> = entities.iter().map(|e| fold(e)).collect();
    let mut records: Vec<ConnectionRecord> = Vec::new();

    for article in articles {
        let text = fold(&article.searchable_text());
        for (entity, needle) in entities.iter().zip(&folded) {
            if !text.contains(needle.as_str()) {
                continue;
            }
            match records.iter_mut().find(|r| fold(&r.entity_name) == *needle) {
                Some(record) => {
                    record.mention_count += 1;
                    if !record.supporting_articles.iter().any(|s| s.url == article.url) {
                        record.supporting_articles.push(ArticleRef::from(article));
                    }
                }
                None => records.push(ConnectionRecord {
                    entity_name: entity.clone(),
                    mention_count: 1,
                    category,
                    supporting_articles: vec![ArticleRef::from(article)],
                }),
            }
        }
    }

    records.sort_by_key(|r| Reverse(r.mention_count));
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn article(url: &str, date: Option<(i32, u32, u32)>, body: &str) -> Article {
        Article::new(url, format!("title {url}"), "Test")
            .with_date(date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)))
            .with_body(body)
    }

    #[test]
    fn events_are_newest_first_and_keyword_gated() {
        let lexicon = Lexicon::shared_default();
        let articles = vec![
            article("a", Some((2020, 1, 1)), "hükümetin kararı"),
            article("b", Some((2021, 1, 1)), "hava güzel"),
            article("c", Some((2022, 1, 1)), "AKP il başkanı"),
            article("d", None, "devlet ihalesi"),
        ];

        let urls: Vec<_> = key_events(&articles, &lexicon).into_iter().map(|e| e.url).collect();

        assert_eq!(urls, ["c", "a", "d"]);
    }

    #[test]
    fn events_stop_at_ten_candidates() {
        let lexicon = Lexicon::shared_default();
        let articles: Vec<_> = (0..15)
            .map(|i| article(&format!("u{i}"), Some((2020, 1, i + 1)), "vergi"))
            .collect();
        assert_eq!(key_events(&articles, &lexicon).len(), EVENT_CANDIDATES);
    }

    #[test]
    fn description_falls_back_to_truncated_first_paragraph() {
        let long = "hükümet ".repeat(40);
        let a = article("a", None, &format!("{long}\n\nsecond paragraph"));
        let event = &key_events(&[a], &Lexicon::shared_default())[0];
        assert_eq!(event.description.chars().count(), 200);
        assert!(event.description.ends_with("..."));

        let with_summary = article("b", None, "ihale").with_summary("short summary");
        let event = &key_events(&[with_summary], &Lexicon::shared_default())[0];
        assert_eq!(event.description, "short summary");
    }

    #[test]
    fn people_merge_roster_and_politicians() {
        let lexicon = Lexicon::shared_default();
        let articles = vec![
            article("a", None, "Ayşe Kaya ile Erdoğan görüştü. Erdoğan açıkladı."),
            article("b", None, "Erdoğan, Erdoğan ve Erdoğan. Süleyman Soylu da katıldı."),
        ];
        let roster = vec![
            RosterEntry {
                subject: "Acme".into(),
                name: "Ayşe Kaya".into(),
                role: Some("CEO".into()),
                tier: None,
            },
            RosterEntry {
                subject: "Acme".into(),
                name: "Mehmet Demir".into(),
                role: None,
                tier: None,
            },
        ];

        let people = key_people(&articles, &roster, &lexicon);

        let names: Vec<_> = people.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["erdoğan", "Ayşe Kaya", "süleyman soylu"]);
        assert_eq!(people[0].mention_count, 5);
        assert_eq!(people[0].relation_tier, RelationTier::Medium);
        assert_eq!(people[0].role, POLITICIAN_ROLE);
        assert_eq!(people[1].role, "CEO");
        assert_eq!(people[1].relation_tier, RelationTier::Low);
    }

    #[test]
    fn roster_entries_shadow_politicians() {
        let lexicon = Lexicon::shared_default();
        let roster = vec![RosterEntry {
            subject: "Acme".into(),
            name: "Erdoğan".into(),
            role: None,
            tier: Some(RelationTier::High),
        }];

        let people = key_people(&[article("a", None, "Erdoğan")], &roster, &lexicon);

        assert_eq!(people.len(), 1);
        assert_eq!(people[0].role, UNKNOWN_ROLE);
        assert_eq!(people[0].relation_tier, RelationTier::High);
    }

    #[test]
    fn connections_count_once_per_article_and_dedup_support() {
        let entities = vec!["TOKİ".to_string(), "TMSF".to_string(), "Merkez Bankası".to_string()];
        let articles = vec![
            article("a", None, "TOKİ ihalesi, TOKİ yine"),
            article("b", None, "toki ve merkez bankası"),
            article("c", None, "hiçbiri"),
        ];

        let records = connections(&articles, &entities, ConnectionCategory::Institution);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].entity_name, "TOKİ");
        assert_eq!(records[0].mention_count, 2);
        let support: Vec<_> = records[0].supporting_articles.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(support, ["a", "b"]);
        assert_eq!(records[1].entity_name, "Merkez Bankası");
        assert_eq!(records[1].category, ConnectionCategory::Institution);
    }

    #[test]
    fn connections_match_inside_longer_words() {
        let entities = vec!["AKP".to_string()];
        let records = connections(
            &[article("a", None, "AKP'li vekil")],
            &entities,
            ConnectionCategory::Party,
        );
        assert_eq!(records[0].mention_count, 1);
    }
}
