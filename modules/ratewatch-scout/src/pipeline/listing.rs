//! Search-result listing: one candidate per on-topic result block.

use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use ratewatch_common::config::DEFAULT_SKIP_LEADING_ROWS;

use crate::browser::{BrowserError, BrowserSession, Element};
use crate::extract::clean_text;

use super::site;

/// Title keywords marking a new debt issuance rather than a rating action.
const ISSUANCE_KEYWORDS: &[&str] = &[
    "debenture",
    "debênture",
    "issuance",
    "bond",
    "note",
    "emissão",
    "cri",
    "cra",
    "fidc",
    "cotas",
];

/// Excludes result rows whose lower-cased title contains an issuance keyword.
#[derive(Debug, Clone)]
pub struct TopicFilter {
    keywords: Vec<String>,
}

impl TopicFilter {
    pub fn standard() -> Self {
        Self::new(ISSUANCE_KEYWORDS.iter().copied())
    }

    pub fn new<S: Into<String>>(keywords: impl IntoIterator<Item = S>) -> Self {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
        }
    }

    pub fn is_off_topic(&self, title: &str) -> bool {
        let lower = title.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
    }
}

impl Default for TopicFilter {
    fn default() -> Self {
        Self::standard()
    }
}

/// How many result blocks at the top of the list are dropped unread.
///
/// The first block has always been skipped. Whether it is a masthead entry
/// or a genuine result is still unconfirmed, so the count stays configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadingRowPolicy {
    pub skip: usize,
}

impl LeadingRowPolicy {
    pub fn new(skip: usize) -> Self {
        Self { skip }
    }

    pub fn keep_all() -> Self {
        Self { skip: 0 }
    }
}

impl Default for LeadingRowPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_SKIP_LEADING_ROWS)
    }
}

/// One detail page worth fetching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub date: String,
    pub link: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("result block has no title link")]
    MissingTitleLink,

    #[error("title link has no href")]
    MissingHref,

    #[error("result block has no {0} date token")]
    MissingDate(&'static str),

    #[error("href could not be resolved: {0}")]
    BadLink(String),

    #[error(transparent)]
    Browser(#[from] BrowserError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedRow {
    Candidate(Candidate),
    OffTopic(String),
}

/// Everything the listing step produced, in document order.
#[derive(Debug, Clone, Default)]
pub struct ListedRows {
    pub candidates: Vec<Candidate>,
    pub blocks: usize,
    pub leading_skipped: usize,
    pub off_topic: usize,
    pub malformed: usize,
}

pub struct RowLister {
    site_url: Url,
    filter: TopicFilter,
    leading: LeadingRowPolicy,
}

impl RowLister {
    pub fn new(site_url: Url, leading: LeadingRowPolicy) -> Self {
        Self {
            site_url,
            filter: TopicFilter::standard(),
            leading,
        }
    }

    /// Read the result blocks off the loaded search page. A malformed block
    /// is counted and skipped; only a failing page lookup aborts the listing.
    pub fn list<S: BrowserSession + ?Sized>(&self, session: &S) -> Result<ListedRows, BrowserError> {
        let blocks = session.locate_all(site::RESULT_BLOCK)?;
        info!(blocks = blocks.len(), "Result blocks found");

        let mut listed = ListedRows {
            blocks: blocks.len(),
            leading_skipped: self.leading.skip.min(blocks.len()),
            ..Default::default()
        };

        for (index, block) in blocks.iter().enumerate().skip(self.leading.skip) {
            match self.parse_row(block) {
                Ok(ParsedRow::Candidate(candidate)) => listed.candidates.push(candidate),
                Ok(ParsedRow::OffTopic(title)) => {
                    info!(index, title = title.as_str(), "Skipping issuance row");
                    listed.off_topic += 1;
                }
                Err(e) => {
                    warn!(index, error = %e, "Skipping malformed row");
                    listed.malformed += 1;
                }
            }
        }

        info!(
            candidates = listed.candidates.len(),
            off_topic = listed.off_topic,
            malformed = listed.malformed,
            "Listing complete"
        );
        Ok(listed)
    }

    pub fn parse_row(&self, block: &Element) -> Result<ParsedRow, RowError> {
        let link = block
            .locate_first(site::TITLE_LINK)?
            .ok_or(RowError::MissingTitleLink)?;

        let title = clean_text(link.inner_text());
        if self.filter.is_off_topic(&title) {
            return Ok(ParsedRow::OffTopic(title));
        }

        let href = link
            .attribute("href")
            .filter(|h| !h.trim().is_empty())
            .ok_or(RowError::MissingHref)?;
        let link = site::resolve_link(&self.site_url, href)
            .ok_or_else(|| RowError::BadLink(href.to_string()))?;

        let day = block
            .locate_first(site::DATE_DAY)?
            .ok_or(RowError::MissingDate("day"))?;
        let month_year = block
            .locate_first(site::DATE_MONTH_YEAR)?
            .ok_or(RowError::MissingDate("month/year"))?;
        let date = clean_text(&format!("{} {}", day.inner_text(), month_year.inner_text()));

        Ok(ParsedRow::Candidate(Candidate { title, date, link }))
    }
}
