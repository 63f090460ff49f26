use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use super::{BrowserError, BrowserSession, Element, PageSnapshot};

/// Session driving a local headless Chromium with `--dump-dom`. Every
/// navigation launches one short-lived process with a throwaway profile.
/// Once a page is ready, later probes only read the snapshot.
pub struct ChromeSession {
    chrome_bin: String,
    page: Option<PageSnapshot>,
    load_timeout: Duration,
    // The current snapshot has already satisfied a readiness wait.
    settled: bool,
    closed: bool,
}

impl ChromeSession {
    pub fn new(chrome_bin: &str) -> Self {
        info!(chrome_bin, "Using ChromeSession (dump-dom)");
        Self {
            chrome_bin: chrome_bin.to_string(),
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

    /// Run Chrome once and return the serialized DOM. `settle` lets the page
    /// run scripts for that much virtual time before the dump.
    async fn dump_dom(
        &self,
        url: &str,
        settle: Option<Duration>,
        timeout: Duration,
    ) -> Result<String, BrowserError> {
        let parsed = url::Url::parse(url).map_err(|e| BrowserError::Navigation {
            url: url.to_string(),
            message: format!("invalid URL: {e}"),
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                message: format!("only http/https URLs are allowed, got {}", parsed.scheme()),
            });
        }

        let tmp_dir = tempfile::tempdir()
            .map_err(|e| BrowserError::SessionLost(format!("temp profile dir: {e}")))?;

        let mut args = vec![
            "--headless".to_string(),
            "--no-sandbox".to_string(),
            "--disable-gpu".to_string(),
            "--disable-dev-shm-usage".to_string(),
            format!("--user-data-dir={}", tmp_dir.path().display()),
        ];
        if let Some(settle) = settle {
            args.push(format!("--virtual-time-budget={}", settle.as_millis()));
        }
        args.push("--dump-dom".to_string());
        args.push(url.to_string());

        let result = tokio::time::timeout(
            timeout,
            tokio::process::Command::new(&self.chrome_bin)
                .args(&args)
                .kill_on_drop(true)
                .output(),
        )
        .await;

        match result {
            Err(_) => Err(BrowserError::Timeout {
                url: url.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }),
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => Err(
                BrowserError::SessionLost(format!("{} not found: {e}", self.chrome_bin)),
            ),
            Ok(Err(e)) => Err(BrowserError::SessionLost(format!(
                "failed to launch {}: {e}",
                self.chrome_bin
            ))),
            Ok(Ok(output)) if !output.status.success() => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                warn!(url, browser = "chrome", stderr = %stderr, "Chrome exited with error");
                Err(BrowserError::Navigation {
                    url: url.to_string(),
                    message: format!("chrome exited with {}", output.status),
                })
            }
            Ok(Ok(output)) if output.stdout.is_empty() => Err(BrowserError::Navigation {
                url: url.to_string(),
                message: "empty DOM output".to_string(),
            }),
            Ok(Ok(output)) => Ok(String::from_utf8_lossy(&output.stdout).into_owned()),
        }
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn navigate_to(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        self.ensure_open()?;
        info!(url, browser = "chrome", "Navigating");

        let html = self.dump_dom(url, None, timeout).await?;
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

        let html = match self
            .dump_dom(&url, Some(timeout), self.load_timeout + timeout)
            .await
        {
            Ok(html) => html,
            Err(e) if e.is_timeout() => return Err(not_ready()),
            Err(e) => return Err(e),
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
        "chrome"
    }
}
