pub mod error;
pub mod types;

pub use error::{BrowserlessError, Result};
pub use types::{ContentRequest, FunctionRequest, GotoOptions};

use std::time::Duration;

use serde::Serialize;

pub struct BrowserlessClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BrowserlessClient {
    /// `timeout` bounds the whole HTTP exchange, including the time the
    /// remote browser spends navigating and waiting.
    pub fn new(base_url: &str, token: Option<&str>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        })
    }

    /// Fully-rendered HTML for `request.url` via the /content endpoint.
    pub async fn content_with(&self, request: &ContentRequest) -> Result<String> {
        tracing::debug!(url = %request.url, "Browserless content");
        self.post("content", request).await
    }

    /// Run a puppeteer function in an isolated browser session via /function.
    /// Returns the raw response body; its shape is whatever the function returns.
    pub async fn function(&self, request: &FunctionRequest) -> Result<String> {
        self.post("function", request).await
    }

    fn endpoint(&self, path: &str) -> String {
        let mut endpoint = format!("{}/{}", self.base_url, path);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("?token={token}"));
        }
        endpoint
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<String> {
        let resp = self
            .client
            .post(self.endpoint(path))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BrowserlessError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_appended_as_query() {
        let client =
            BrowserlessClient::new("http://chrome:3000/", Some("s3cret"), Duration::from_secs(5))
                .unwrap();
        assert_eq!(client.endpoint("content"), "http://chrome:3000/content?token=s3cret");

        let open = BrowserlessClient::new("http://chrome:3000", None, Duration::from_secs(5)).unwrap();
        assert_eq!(open.endpoint("function"), "http://chrome:3000/function");
    }

    #[test]
    fn timeout_status_is_recognised() {
        let err = BrowserlessError::Api {
            status: 408,
            message: "Timed out".into(),
        };
        assert!(err.is_timeout());
        assert!(!BrowserlessError::Network("reset".into()).is_timeout());
    }
}
