//! Relation scoring: whole-word keyword frequency over an article set.

use std::cmp::Reverse;
use std::collections::HashMap;

use relwatch_common::lexicon::Keyword;
use relwatch_common::{fold, Article, KeywordCount, Lexicon, RelationMetrics};

/// Party mentions count double.
pub const PARTY_WEIGHT: usize = 2;

/// Scales the raw mention density into the 0..1 range.
const DENSITY_SCALE: f64 = 10.0;

pub fn compute_metrics(articles: &[Article], lexicon: &Lexicon) -> RelationMetrics {
    let mut institution = 0;
    let mut party = 0;
    let mut total_words = 0;
    let mut tally = Tally::default();

    for article in articles {
        let text = fold(&article.searchable_text());
        institution += count_keywords(&lexicon.institution_keywords, &text, &mut tally);
        party += count_keywords(&lexicon.party_keywords, &text, &mut tally);
        total_words += lexicon.content_word_count(&text);
    }

    RelationMetrics {
        institution_mention_count: institution,
        party_mention_count: party,
        total_word_count: total_words,
        score: relation_score(institution, party, total_words),
        top_keywords: tally.into_sorted(),
    }
}

/// `min(1, (institution + 2·party) / words · 10)`, or 0 for an empty text.
pub fn relation_score(institution: usize, party: usize, total_words: usize) -> f64 {
    if total_words == 0 {
        return 0.0;
    }
    let weighted = (institution + PARTY_WEIGHT * party) as f64;
    (weighted * DENSITY_SCALE / total_words as f64).min(1.0)
}

fn count_keywords(keywords: &[Keyword], text: &str, tally: &mut Tally) -> usize {
    let mut sum = 0;
    for keyword in keywords {
        let n = keyword.count_in(text);
        if n > 0 {
            sum += n;
            tally.add(&keyword.label, n);
        }
    }
    sum
}

/// Keyword counts in first-seen order, so ties keep lexicon order.
#[derive(Default)]
struct Tally {
    counts: Vec<KeywordCount>,
    index: HashMap<String, usize>,
}

impl Tally {
    fn add(&mut self, keyword: &str, n: usize) {
        match self.index.get(keyword) {
            Some(&i) => self.counts[i].count += n,
            None => {
                self.index.insert(keyword.to_string(), self.counts.len());
                self.counts.push(KeywordCount {
                    keyword: keyword.to_string(),
                    count: n,
                });
            }
        }
    }

    fn into_sorted(mut self) -> Vec<KeywordCount> {
        self.counts.sort_by_key(|k| Reverse(k.count));
        self.counts
    }
}
