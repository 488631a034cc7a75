use async_trait::async_trait;

use relwatch_common::{fold, Result, RosterEntry};

/// Source of individuals affiliated with a subject (executives, board
/// members). Used for key-people counts and per-person search queries.
#[async_trait]
pub trait RosterProvider: Send + Sync {
    async fn people(&self, subject: &str) -> Result<Vec<RosterEntry>>;
}

/// Roster from the `[[roster]]` config tables.
#[derive(Debug, Clone, Default)]
pub struct StaticRoster {
    entries: Vec<RosterEntry>,
}

impl StaticRoster {
    pub fn new(entries: Vec<RosterEntry>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl RosterProvider for StaticRoster {
    async fn people(&self, subject: &str) -> Result<Vec<RosterEntry>> {
        let key = fold(subject.trim());
        Ok(self
            .entries
            .iter()
            .filter(|e| fold(e.subject.trim()) == key)
            .cloned()
            .collect())
    }
}
