// Browser automation via Browserless. Each call runs in its own remote
// session, which Browserless tears down when the request ends or is dropped.

use async_trait::async_trait;
use browserless_client::{BrowserlessClient, BrowserlessError, ContentRequest, FunctionRequest};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use relwatch_common::{RelwatchError, Result, RetrievalConfig, SourceConfig};

/// Fill the search form, submit it, and hand back the rendered results page.
const SEARCH_FUNCTION: &str = r#"
export default async function ({ page, context }) {
  await page.setViewport({ width: 1280, height: 800 });
  await page.goto(context.searchUrl, {
    waitUntil: "domcontentloaded",
    timeout: context.navigationTimeout,
  });
  await page.type(context.searchInput, context.query);
  await page.click(context.searchButton);
  await page.waitForSelector(context.resultList, { timeout: context.waitTimeout });
  return { data: await page.content(), type: "text/html" };
}
"#;

pub struct BrowserlessAutomation {
    client: BrowserlessClient,
    navigation_timeout_ms: u64,
    wait_timeout_ms: u64,
}

impl BrowserlessAutomation {
    pub fn new(client: BrowserlessClient, settings: &RetrievalConfig) -> Self {
        Self {
            client,
            navigation_timeout_ms: settings.navigation_timeout_ms,
            wait_timeout_ms: settings.wait_timeout_ms,
        }
    }
}

fn unavailable(source: &SourceConfig, err: BrowserlessError) -> RelwatchError {
    let reason = if err.is_timeout() {
        format!("timed out: {err}")
    } else {
        err.to_string()
    };
    RelwatchError::unavailable(source.key.clone(), reason)
}

#[derive(Deserialize)]
struct FunctionOutput {
    data: String,
}

/// Some Browserless versions wrap the returned `{ data, type }` as JSON
/// instead of serving `data` with that content type.
fn unwrap_function_body(body: String) -> String {
    if body.trim_start().starts_with('{') {
        if let Ok(out) = serde_json::from_str::<FunctionOutput>(&body) {
            return out.data;
        }
    }
    body
}

#[async_trait]
impl crate::traits::BrowserAutomation for BrowserlessAutomation {
    async fn search_page(&self, source: &SourceConfig, terms: &str) -> Result<String> {
        debug!(source = %source.key, terms, "browser: submitting search form");
        let request = FunctionRequest {
            code: SEARCH_FUNCTION.to_string(),
            context: json!({
                "searchUrl": source.search_url,
                "searchInput": source.selectors.search_input,
                "searchButton": source.selectors.search_button,
                "resultList": source.selectors.result_list,
                "query": terms,
                "navigationTimeout": self.navigation_timeout_ms,
                "waitTimeout": self.wait_timeout_ms,
            }),
        };
        let body = self
            .client
            .function(&request)
            .await
            .map_err(|e| unavailable(source, e))?;
        Ok(unwrap_function_body(body))
    }

    async fn article_page(&self, source: &SourceConfig, url: &str) -> Result<String> {
        let request = ContentRequest::new(url).navigation_timeout(self.navigation_timeout_ms);
        self.client
            .content_with(&request)
            .await
            .map_err(|e| unavailable(source, e))
    }
}
