use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserlessError>;

#[derive(Debug, Error)]
pub enum BrowserlessError {
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx from Browserless. A 408 means a navigation or selector wait
    /// ran past its timeout inside the browser.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl BrowserlessError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, BrowserlessError::Api { status: 408, .. })
    }
}

impl From<reqwest::Error> for BrowserlessError {
    fn from(err: reqwest::Error) -> Self {
        BrowserlessError::Network(err.to_string())
    }
}
