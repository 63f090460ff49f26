use std::time::Duration;

use tracing::{debug, warn};

use crate::browser::{BrowserError, BrowserSession};

/// Owns the run's single browser session and drives it from page to page.
pub struct PageNavigator<S> {
    session: S,
}

impl<S: BrowserSession> PageNavigator<S> {
    pub fn new(session: S) -> Self {
        Self { session }
    }

    /// Load `url` and wait for its readiness marker. A marker that never
    /// appears is a `NavigationTimeout`.
    pub async fn navigate(
        &mut self,
        url: &str,
        ready_selector: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        self.session.navigate_to(url, timeout).await?;
        self.session
            .wait_for_selector(ready_selector, timeout)
            .await
            .inspect_err(|e| warn!(url, ready_selector, error = %e, "Page never became ready"))
    }

    /// Probe the current page for an optional region. `Ok(false)` when it
    /// does not show up in time; other failures propagate.
    pub async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<bool, BrowserError> {
        match self.session.wait_for_selector(selector, timeout).await {
            Ok(()) => Ok(true),
            Err(e) if e.is_timeout() => {
                debug!(selector, timeout_ms = timeout.as_millis() as u64, "Optional region absent");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub async fn close(&mut self) -> Result<(), BrowserError> {
        self.session.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{detail_page, FixtureSession};

    const URL: &str = "https://ratings.test/research/a";

    #[tokio::test]
    async fn navigate_requires_the_readiness_marker() {
        let session = FixtureSession::new().on_page(URL, "<html><body><p>vazio</p></body></html>");
        let mut nav = PageNavigator::new(session);
        let err = nav
            .navigate(URL, ".frw-RAC", Duration::from_millis(10))
            .await
            .unwrap_err();
        assert!(matches!(err, BrowserError::NavigationTimeout { .. }));
    }

    #[tokio::test]
    async fn missing_optional_region_is_not_an_error() {
        let session = FixtureSession::new().on_page(URL, &detail_page("Texto").html());
        let mut nav = PageNavigator::new(session);
        nav.navigate(URL, ".frw-RAC", Duration::from_secs(1)).await.unwrap();
        assert!(!nav.wait_for(".rt-table", Duration::from_millis(10)).await.unwrap());
    }

    #[tokio::test]
    async fn present_region_is_reported() {
        let html = detail_page("Texto")
            .table_row("Empresa Alfa S.A.", "AA(bra)", "AA(bra)")
            .html();
        let session = FixtureSession::new().on_page(URL, &html);
        let mut nav = PageNavigator::new(session);
        nav.navigate(URL, ".frw-RAC", Duration::from_secs(1)).await.unwrap();
        assert!(nav.wait_for(".rt-table", Duration::from_millis(10)).await.unwrap());
    }
}
