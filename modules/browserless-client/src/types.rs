use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GotoOptions {
    pub wait_until: String,
    /// Milliseconds.
    pub timeout: u64,
}

/// Body for `POST /content`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goto_options: Option<GotoOptions>,
}

impl ContentRequest {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            goto_options: None,
        }
    }

    pub fn navigation_timeout(mut self, timeout_ms: u64) -> Self {
        self.goto_options = Some(GotoOptions {
            wait_until: "domcontentloaded".to_string(),
            timeout: timeout_ms,
        });
        self
    }
}

/// Body for `POST /function`: an ES module whose default export receives
/// `{ page, context }`.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionRequest {
    pub code: String,
    pub context: serde_json::Value,
}
