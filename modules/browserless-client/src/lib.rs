pub mod error;

pub use error::{BrowserlessError, Result};

use std::time::Duration;

use serde::Serialize;

/// Slack added on top of the render budget so the HTTP request outlives the
/// browser-side timeouts and we see Browserless' own timeout response.
const REQUEST_SLACK: Duration = Duration::from_secs(10);

pub struct BrowserlessClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

/// Body of a `/content` request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goto_options: Option<GotoOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for_selector: Option<WaitForSelector>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GotoOptions {
    /// Milliseconds.
    pub timeout: u64,
    pub wait_until: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WaitForSelector {
    pub selector: String,
    /// Milliseconds.
    pub timeout: u64,
}

impl ContentRequest {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            goto_options: None,
            wait_for_selector: None,
        }
    }

    /// Bound the page load.
    pub fn goto_timeout(mut self, timeout: Duration) -> Self {
        self.goto_options = Some(GotoOptions {
            timeout: timeout.as_millis() as u64,
            wait_until: "networkidle2".to_string(),
        });
        self
    }

    /// Hold the response until `selector` is present, failing after `timeout`.
    pub fn wait_for(mut self, selector: &str, timeout: Duration) -> Self {
        self.wait_for_selector = Some(WaitForSelector {
            selector: selector.to_string(),
            timeout: timeout.as_millis() as u64,
        });
        self
    }

    /// Total time the browser side may spend on this request.
    fn render_budget(&self) -> Duration {
        let goto = self.goto_options.as_ref().map(|g| g.timeout).unwrap_or(30_000);
        let wait = self.wait_for_selector.as_ref().map(|w| w.timeout).unwrap_or(0);
        Duration::from_millis(goto + wait)
    }
}

impl BrowserlessClient {
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        }
    }

    /// Render a page with explicit load/readiness options.
    pub async fn render(&self, request: &ContentRequest) -> Result<String> {
        let mut endpoint = format!("{}/content", self.base_url);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("?token={token}"));
        }

        tracing::debug!(url = request.url.as_str(), "Browserless render");

        let resp = self
            .client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .timeout(request.render_budget() + REQUEST_SLACK)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            if status.as_u16() == 408 || looks_like_timeout(&message) {
                return Err(BrowserlessError::Timeout(message));
            }
            return Err(BrowserlessError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.text().await?)
    }
}

fn looks_like_timeout(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("timeouterror") || lower.contains("timeout exceeded")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_request_serializes_only_url() {
        let body = serde_json::to_value(ContentRequest::new("https://example.com")).unwrap();
        assert_eq!(body, serde_json::json!({ "url": "https://example.com" }));
    }

    #[test]
    fn options_serialize_in_browserless_shape() {
        let request = ContentRequest::new("https://example.com")
            .goto_timeout(Duration::from_secs(60))
            .wait_for(".frw-RAC", Duration::from_secs(5));
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["gotoOptions"]["timeout"], 60_000);
        assert_eq!(body["gotoOptions"]["waitUntil"], "networkidle2");
        assert_eq!(body["waitForSelector"]["selector"], ".frw-RAC");
        assert_eq!(body["waitForSelector"]["timeout"], 5_000);
        assert_eq!(request.render_budget(), Duration::from_secs(65));
    }

    #[test]
    fn timeout_messages_are_recognised() {
        assert!(looks_like_timeout("TimeoutError: Waiting for selector `.x` failed"));
        assert!(looks_like_timeout("Navigation timeout exceeded"));
        assert!(!looks_like_timeout("Bad Request"));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = BrowserlessClient::new("http://localhost:3000/", None);
        assert_eq!(client.base_url, "http://localhost:3000");
    }
}
