// Test doubles for the scout pipeline.
//
// - FixtureSession (BrowserSession): HashMap-based URL→HTML, shared log of
//   navigations and close calls, injectable session loss
// - search_page / ResultRow: result-list HTML in the site's markup
// - detail_page / DetailFixture: announcement HTML with optional heading and table

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::browser::{BrowserError, BrowserSession, Element, PageSnapshot};

// ---------------------------------------------------------------------------
// Test constants
// ---------------------------------------------------------------------------

/// Base URL fixture sites are served from.
pub const SITE_URL: &str = "https://ratings.test";

/// The search URL a default scout navigates to against [`SITE_URL`].
pub fn search_url() -> String {
    let site = url::Url::parse(SITE_URL).expect("valid fixture URL");
    crate::pipeline::SearchQuery::default()
        .url(&site)
        .expect("valid search URL")
        .to_string()
}

/// Absolute fixture URL for a site path.
pub fn site_link(path: &str) -> String {
    format!("{SITE_URL}{path}")
}

// ---------------------------------------------------------------------------
// FixtureSession
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct SessionLog {
    navigations: Vec<String>,
    close_calls: usize,
}

/// Observes a [`FixtureSession`] after it has been moved into a scout.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle(Arc<Mutex<SessionLog>>);

impl SessionHandle {
    pub fn navigations(&self) -> Vec<String> {
        self.0.lock().unwrap().navigations.clone()
    }

    pub fn fetch_count(&self, url: &str) -> usize {
        self.0
            .lock()
            .unwrap()
            .navigations
            .iter()
            .filter(|u| u.as_str() == url)
            .count()
    }

    pub fn close_calls(&self) -> usize {
        self.0.lock().unwrap().close_calls
    }

    pub fn closed(&self) -> bool {
        self.close_calls() > 0
    }
}

/// HashMap-based browser session. Unregistered URLs fail navigation;
/// URLs registered with `.on_lost()` report the session as lost.
/// Builder pattern: `.on_page()`, `.on_lost()`.
pub struct FixtureSession {
    pages: HashMap<String, String>,
    lost: HashSet<String>,
    page: Option<PageSnapshot>,
    closed: bool,
    log: SessionHandle,
}

impl FixtureSession {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            lost: HashSet::new(),
            page: None,
            closed: false,
            log: SessionHandle::default(),
        }
    }

    pub fn on_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn on_lost(mut self, url: &str) -> Self {
        self.lost.insert(url.to_string());
        self
    }

    pub fn handle(&self) -> SessionHandle {
        self.log.clone()
    }
}

impl Default for FixtureSession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrowserSession for FixtureSession {
    async fn navigate_to(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        if self.closed {
            return Err(BrowserError::SessionLost("session already closed".to_string()));
        }
        self.log.0.lock().unwrap().navigations.push(url.to_string());

        if self.lost.contains(url) {
            self.page = None;
            return Err(BrowserError::SessionLost(format!("browser crashed loading {url}")));
        }
        match self.pages.get(url) {
            Some(html) => {
                self.page = Some(PageSnapshot::new(url, html.clone()));
                Ok(())
            }
            None => Err(BrowserError::Timeout {
                url: url.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        let page = self.page.as_ref().ok_or(BrowserError::NoPage)?;
        if page.has(selector)? {
            Ok(())
        } else {
            Err(BrowserError::NavigationTimeout {
                url: page.url.clone(),
                selector: selector.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            })
        }
    }

    fn locate_all(&self, selector: &str) -> Result<Vec<Element>, BrowserError> {
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
        self.log.0.lock().unwrap().close_calls += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "fixture"
    }
}

// ---------------------------------------------------------------------------
// HTML builders
// ---------------------------------------------------------------------------

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// One block of the search-result list.
#[derive(Debug, Clone)]
pub struct ResultRow {
    title: String,
    href: String,
    day: String,
    month_year: String,
    with_link: bool,
    with_href: bool,
    with_date: bool,
}

impl ResultRow {
    pub fn new(title: &str, href: &str, day: &str, month_year: &str) -> Self {
        Self {
            title: title.to_string(),
            href: href.to_string(),
            day: day.to_string(),
            month_year: month_year.to_string(),
            with_link: true,
            with_href: true,
            with_date: true,
        }
    }

    /// A leading block, dropped by the default listing policy.
    pub fn masthead() -> Self {
        Self::new("Rating Action Commentary", "/research/latest", "", "")
    }

    pub fn without_link(mut self) -> Self {
        self.with_link = false;
        self
    }

    pub fn without_href(mut self) -> Self {
        self.with_href = false;
        self
    }

    pub fn without_date(mut self) -> Self {
        self.with_date = false;
        self
    }

    fn html(&self) -> String {
        let title = if !self.with_link {
            format!("<h3 class=\"frw-article-data--title\">{}</h3>", escape(&self.title))
        } else if !self.with_href {
            format!(
                "<h3 class=\"frw-article-data--title\"><a>{}</a></h3>",
                escape(&self.title)
            )
        } else {
            format!(
                "<h3 class=\"frw-article-data--title\"><a href=\"{}\">{}</a></h3>",
                escape(&self.href),
                escape(&self.title)
            )
        };
        let date = if self.with_date {
            format!(
                "<div class=\"frw-date\"><span class=\"frw-date__1\">{}</span>\
                 <span class=\"frw-date__2\">{}</span></div>",
                escape(&self.day),
                escape(&self.month_year)
            )
        } else {
            String::new()
        };
        format!("<div class=\"frw-article-data\">{date}{title}</div>")
    }
}

/// Search page with the given blocks, in order, inside the results container.
pub fn search_page(rows: &[ResultRow]) -> String {
    let blocks: String = rows.iter().map(ResultRow::html).collect();
    format!(
        "<html><body><header><h1>Search</h1></header>\
         <div class=\"frw-column__main\">{blocks}</div></body></html>"
    )
}

/// A page without the results container, as served when the search breaks.
pub fn broken_search_page() -> String {
    "<html><body><div class=\"frw-error\">Something went wrong</div></body></html>".to_string()
}

/// Announcement page builder: `detail_page(body).heading(..).table_row(..).html()`.
#[derive(Debug, Clone)]
pub struct DetailFixture {
    heading: Option<String>,
    paragraphs: Vec<String>,
    table: Vec<[String; 3]>,
}

pub fn detail_page(body: &str) -> DetailFixture {
    DetailFixture {
        heading: None,
        paragraphs: vec![body.to_string()],
        table: Vec::new(),
    }
}

impl DetailFixture {
    pub fn heading(mut self, heading: &str) -> Self {
        self.heading = Some(heading.to_string());
        self
    }

    pub fn paragraph(mut self, text: &str) -> Self {
        self.paragraphs.push(text.to_string());
        self
    }

    pub fn table_row(mut self, entity: &str, current: &str, prior: &str) -> Self {
        self.table
            .push([entity.to_string(), current.to_string(), prior.to_string()]);
        self
    }

    pub fn html(&self) -> String {
        let heading = self
            .heading
            .as_deref()
            .map(|h| format!("<h1>{}</h1>", escape(h)))
            .unwrap_or_default();

        let body: String = self
            .paragraphs
            .iter()
            .map(|p| format!("<p>{}</p>", escape(p)))
            .collect();

        let table = if self.table.is_empty() {
            String::new()
        } else {
            let rows: String = self
                .table
                .iter()
                .map(|cells| {
                    let cells: String = cells
                        .iter()
                        .map(|c| format!("<div class=\"rt-td\">{}</div>", escape(c)))
                        .collect();
                    format!("<div class=\"rt-tr-group\"><div class=\"rt-tr\">{cells}</div></div>")
                })
                .collect();
            format!(
                "<div class=\"rt-table\"><div class=\"rt-thead\"><div class=\"rt-tr\">\
                 <div class=\"rt-th\">Entity</div><div class=\"rt-th\">Rating</div>\
                 <div class=\"rt-th\">Prior</div></div></div>\
                 <div class=\"rt-tbody\">{rows}</div></div>"
            )
        };

        format!(
            "<html><body>{heading}<div class=\"frw-RAC\">{body}</div>{table}</body></html>"
        )
    }
}
