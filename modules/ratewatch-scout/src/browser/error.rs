use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrowserError {
    #[error("Page load timed out after {timeout_ms}ms: {url}")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("Timed out after {timeout_ms}ms waiting for `{selector}` on {url}")]
    NavigationTimeout {
        url: String,
        selector: String,
        timeout_ms: u64,
    },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("No page loaded")]
    NoPage,

    #[error("Browser session lost: {0}")]
    SessionLost(String),
}

impl BrowserError {
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            BrowserError::Timeout { .. } | BrowserError::NavigationTimeout { .. }
        )
    }
}
