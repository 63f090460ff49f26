//! Browser capability used by the pipeline.
//!
//! `BrowserSession` is the narrow surface the pipeline needs from a
//! browser-automation backend: navigate, wait for a selector, and locate
//! elements on the current page. Elements come back as owned snapshots so
//! extraction never holds a borrow on the session.

mod browserless;
mod chrome;
mod element;
mod error;

pub use browserless::BrowserlessSession;
pub use chrome::ChromeSession;
pub use element::{Element, PageSnapshot};
pub use error::BrowserError;

use std::time::Duration;

use async_trait::async_trait;

#[async_trait]
pub trait BrowserSession: Send {
    /// Load `url`, replacing the current page. Fails with `Timeout` when the
    /// page does not load within `timeout`.
    async fn navigate_to(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// Wait until `selector` is present on the current page. Fails with
    /// `NavigationTimeout` when it does not appear within `timeout`.
    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError>;

    /// All elements on the current page matching `selector`, in document order.
    fn locate_all(&self, selector: &str) -> Result<Vec<Element>, BrowserError>;

    fn current_url(&self) -> Option<&str>;

    /// Release the backend. Further calls fail with `SessionLost`.
    async fn close(&mut self) -> Result<(), BrowserError>;

    fn name(&self) -> &str;
}
