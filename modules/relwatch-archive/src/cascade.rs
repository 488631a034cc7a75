//! Per-query retrieval state machine.
//!
//! `LocalOnly → ApiAttempted → BrowserAttempted → Done`, forward only. Each
//! online step runs only while the result set is short of the limit, and
//! results are merged local-first with URL dedup.

use std::collections::HashSet;

use relwatch_common::Article;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LocalOnly,
    ApiAttempted,
    BrowserAttempted,
    Done,
}

/// The online step the caller should run next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Hosted,
    Browser,
}

#[derive(Debug)]
pub struct Cascade {
    stage: Stage,
    limit: usize,
    results: Vec<Article>,
    seen: HashSet<String>,
}

impl Cascade {
    /// Start from the corpus hits. Duplicates and overflow are dropped.
    pub fn new(limit: usize, local: Vec<Article>) -> Self {
        let mut cascade = Self {
            stage: Stage::LocalOnly,
            limit,
            results: Vec::with_capacity(limit),
            seen: HashSet::new(),
        };
        cascade.absorb(local);
        cascade
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.results.len())
    }

    pub fn is_satisfied(&self) -> bool {
        self.remaining() == 0
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    /// Move to the next stage. Returns the step to run, or `None` once done.
    pub fn advance(&mut self) -> Option<Step> {
        let next = if self.is_satisfied() {
            Stage::Done
        } else {
            match self.stage {
                Stage::LocalOnly => Stage::ApiAttempted,
                Stage::ApiAttempted => Stage::BrowserAttempted,
                Stage::BrowserAttempted | Stage::Done => Stage::Done,
            }
        };
        self.stage = next;

        match next {
            Stage::ApiAttempted => Some(Step::Hosted),
            Stage::BrowserAttempted => Some(Step::Browser),
            Stage::LocalOnly | Stage::Done => None,
        }
    }

    /// Append unseen articles up to the limit. Returns the ones accepted.
    pub fn absorb(&mut self, articles: Vec<Article>) -> Vec<Article> {
        let mut accepted = Vec::new();
        for article in articles {
            if self.is_satisfied() {
                break;
            }
            if self.seen.insert(article.url.clone()) {
                accepted.push(article.clone());
                self.results.push(article);
            }
        }
        accepted
    }

    pub fn finish(self) -> Vec<Article> {
        self.results
    }
}
