use thiserror::Error;

/// Result type alias for retrieval and analysis operations.
pub type Result<T> = std::result::Result<T, RelwatchError>;

#[derive(Error, Debug)]
pub enum RelwatchError {
    /// One provider or news source failed. Never fatal for a search: the
    /// cascade falls through to the next stage or skips the source.
    #[error("Source unavailable ({provider}): {reason}")]
    SourceUnavailable { provider: String, reason: String },

    /// An article names a source that is not in the registry.
    #[error("Unknown source: {0}")]
    UnknownSource(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Nothing was retrieved (or stored) for the subject.
    #[error("No data for subject: {0}")]
    NoData(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RelwatchError {
    pub fn unavailable(provider: impl Into<String>, reason: impl ToString) -> Self {
        RelwatchError::SourceUnavailable {
            provider: provider.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<std::io::Error> for RelwatchError {
    fn from(err: std::io::Error) -> Self {
        RelwatchError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for RelwatchError {
    fn from(err: serde_json::Error) -> Self {
        RelwatchError::Persistence(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_provider() {
        let err = RelwatchError::unavailable("firecrawl", "status 502");
        assert_eq!(err.to_string(), "Source unavailable (firecrawl): status 502");
    }
}
