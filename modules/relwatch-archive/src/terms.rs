//! Query term parsing for corpus lookups.
//!
//! `acme "ak parti" hükümet OR bakanlık` means: `acme` AND the phrase
//! `ak parti` AND (`hükümet` OR `bakanlık`). Matching is folded substring
//! containment.

use relwatch_common::fold;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryTerms {
    /// Every group must match; a group matches when any alternative does.
    groups: Vec<Vec<String>>,
}

enum Token {
    Term(String),
    Or,
}

impl QueryTerms {
    pub fn parse(raw: &str) -> Self {
        let mut groups: Vec<Vec<String>> = Vec::new();
        let mut pending_or = false;

        for token in tokenize(raw) {
            match token {
                Token::Or => pending_or = !groups.is_empty(),
                Token::Term(term) => {
                    let term = fold(&term);
                    match groups.last_mut() {
                        Some(last) if pending_or => last.push(term),
                        _ => groups.push(vec![term]),
                    }
                    pending_or = false;
                }
            }
        }

        Self { groups }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// True if every group has an alternative contained in `folded_text`.
    pub fn matches(&self, folded_text: &str) -> bool {
        self.groups
            .iter()
            .all(|alts| alts.iter().any(|t| folded_text.contains(t.as_str())))
    }

    pub fn groups(&self) -> &[Vec<String>] {
        &self.groups
    }
}

fn tokenize(raw: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = raw.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '"' {
            chars.next();
            let phrase: String = chars.by_ref().take_while(|&c| c != '"').collect();
            let phrase = phrase.split_whitespace().collect::<Vec<_>>().join(" ");
            if !phrase.is_empty() {
                tokens.push(Token::Term(phrase));
            }
        } else {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() || c == '"' {
                    break;
                }
                word.push(c);
                chars.next();
            }
            if word == "OR" {
                tokens.push(Token::Or);
            } else {
                tokens.push(Token::Term(word));
            }
        }
    }

    tokens
}
