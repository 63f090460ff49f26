use std::time::Duration;

use async_trait::async_trait;
use browserless_client::{BrowserlessClient, BrowserlessError, ContentRequest};
use tracing::{info, warn};

use super::{BrowserError, BrowserSession, Element, PageSnapshot};

/// Session backed by a Browserless `/content` endpoint. Each navigation is
/// one render. A readiness wait that misses a fresh snapshot re-renders the
/// page once and lets Browserless wait for the selector; once the page is
/// ready, later probes only read the snapshot.
pub struct BrowserlessSession {
    client: BrowserlessClient,
    page: Option<PageSnapshot>,
    load_timeout: Duration,
    // The current snapshot has already satisfied a readiness wait.
    settled: bool,
    closed: bool,
}

impl BrowserlessSession {
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        info!(base_url, "Using BrowserlessSession");
        Self {
            client: BrowserlessClient::new(base_url, token),
            page: None,
            load_timeout: Duration::from_secs(30),
            settled: false,
            closed: false,
        }
    }

    fn ensure_open(&self) -> Result<(), BrowserError> {
        if self.closed {
            return Err(BrowserError::SessionLost("session already closed".to_string()));
        }
        Ok(())
    }
}

fn map_render_error(url: &str, budget: Duration, err: BrowserlessError) -> BrowserError {
    match err {
        BrowserlessError::Timeout(_) => BrowserError::Timeout {
            url: url.to_string(),
            timeout_ms: budget.as_millis() as u64,
        },
        // Unreachable service or rejected credentials: nothing further will render.
        BrowserlessError::Network(message) => BrowserError::SessionLost(message),
        BrowserlessError::Api { status, message } if status == 401 || status == 403 => {
            BrowserError::SessionLost(format!("status {status}: {message}"))
        }
        BrowserlessError::Api { status, message } => BrowserError::Navigation {
            url: url.to_string(),
            message: format!("status {status}: {message}"),
        },
    }
}

#[async_trait]
impl BrowserSession for BrowserlessSession {
    async fn navigate_to(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        self.ensure_open()?;
        info!(url, browser = "browserless", "Navigating");

        let request = ContentRequest::new(url).goto_timeout(timeout);
        let html = self
            .client
            .render(&request)
            .await
            .map_err(|e| map_render_error(url, timeout, e))?;

        self.load_timeout = timeout;
        self.settled = false;
        self.page = Some(PageSnapshot::new(url, html));
        Ok(())
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        self.ensure_open()?;
        let page = self.page.as_ref().ok_or(BrowserError::NoPage)?;
        if page.has(selector)? {
            self.settled = true;
            return Ok(());
        }

        let url = page.url.clone();
        let not_ready = || BrowserError::NavigationTimeout {
            url: url.clone(),
            selector: selector.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        };

        // A settled page is final: an optional region missing from it is absent.
        if self.settled {
            return Err(not_ready());
        }

        let request = ContentRequest::new(&url)
            .goto_timeout(self.load_timeout)
            .wait_for(selector, timeout);
        let html = match self.client.render(&request).await {
            Ok(html) => html,
            Err(e) if e.is_timeout() => return Err(not_ready()),
            Err(e) => {
                warn!(url = url.as_str(), selector, error = %e, "Readiness re-render failed");
                return Err(map_render_error(&url, timeout, e));
            }
        };

        let snapshot = PageSnapshot::new(&url, html);
        let ready = snapshot.has(selector)?;
        self.page = Some(snapshot);
        self.settled = ready;
        if ready {
            Ok(())
        } else {
            Err(not_ready())
        }
    }

    fn locate_all(&self, selector: &str) -> Result<Vec<Element>, BrowserError> {
        self.ensure_open()?;
        self.page
            .as_ref()
            .ok_or(BrowserError::NoPage)?
            .locate_all(selector)
    }

    fn current_url(&self) -> Option<&str> {
        self.page.as_ref().map(|p| p.url.as_str())
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.closed = true;
        self.page = None;
        Ok(())
    }

    fn name(&self) -> &str {
        "browserless"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_failure_loses_the_session() {
        let err = map_render_error(
            "https://example.com",
            Duration::from_secs(1),
            BrowserlessError::Network("connection refused".to_string()),
        );
        assert!(matches!(err, BrowserError::SessionLost(_)));
    }

    #[test]
    fn server_error_fails_only_the_page() {
        let err = map_render_error(
            "https://example.com",
            Duration::from_secs(1),
            BrowserlessError::Api {
                status: 500,
                message: "boom".to_string(),
            },
        );
        assert!(matches!(err, BrowserError::Navigation { .. }));
    }

    #[test]
    fn render_timeout_maps_to_load_timeout() {
        let err = map_render_error(
            "https://example.com",
            Duration::from_secs(60),
            BrowserlessError::Timeout("TimeoutError".to_string()),
        );
        assert!(matches!(err, BrowserError::Timeout { timeout_ms: 60_000, .. }));
    }

    #[tokio::test]
    async fn settled_page_answers_optional_probes_without_rendering() {
        // Nothing listens on the service port, so any render would fail as SessionLost.
        let mut session = BrowserlessSession::new("http://127.0.0.1:9", None);
        session.page = Some(PageSnapshot::new(
            "https://ratings.test/research/a",
            "<html><body><div class=\"frw-RAC\">Texto</div></body></html>".to_string(),
        ));

        session
            .wait_for_selector(".frw-RAC", Duration::from_secs(30))
            .await
            .unwrap();
        let err = session
            .wait_for_selector(".rt-table", Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BrowserError::NavigationTimeout { timeout_ms: 50, .. }
        ));
    }

    #[tokio::test]
    async fn closed_session_refuses_navigation() {
        let mut session = BrowserlessSession::new("http://127.0.0.1:9", None);
        session.close().await.unwrap();
        let err = session
            .navigate_to("https://example.com", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, BrowserError::SessionLost(_)));
    }
}
