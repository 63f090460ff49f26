//! One scout run: search, list, then fetch and parse each candidate.

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, info_span, warn, Instrument};
use url::Url;
use uuid::Uuid;

use ratewatch_common::{RatewatchError, RatingActionRecord, ScoutConfig};

use crate::browser::{BrowserError, BrowserSession};
use crate::extract::RecordExtractor;

use super::dedup::Deduplicator;
use super::detail::DetailReader;
use super::listing::{Candidate, LeadingRowPolicy, RowLister};
use super::navigator::PageNavigator;
use super::site::{self, SearchQuery};
use super::stats::RunStats;

/// Failures that end the whole run. Only the listing phase can produce one.
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Search results never became ready: {0}")]
    FatalListing(#[source] BrowserError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    DetailUnavailable(String),
    MissingCompany,
    DuplicateRecord,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::DetailUnavailable(e) => write!(f, "detail unavailable: {e}"),
            SkipReason::MissingCompany => write!(f, "no company found"),
            SkipReason::DuplicateRecord => write!(f, "duplicate record"),
        }
    }
}

/// What happened to one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Accepted(RatingActionRecord),
    Skipped(SkipReason),
}

/// State that lives exactly as long as one run.
#[derive(Debug)]
pub struct RunContext {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub stats: RunStats,
    dedup: Deduplicator,
    records: Vec<RatingActionRecord>,
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            stats: RunStats::default(),
            dedup: Deduplicator::new(),
            records: Vec::new(),
        }
    }

    fn record(&mut self, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Accepted(record) => {
                self.stats.records_kept += 1;
                self.records.push(record);
            }
            ItemOutcome::Skipped(reason) => match reason {
                SkipReason::DetailUnavailable(_) => self.stats.details_failed += 1,
                SkipReason::MissingCompany => self.stats.missing_company += 1,
                SkipReason::DuplicateRecord => self.stats.duplicate_records += 1,
            },
        }
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

/// The records that survived one run, in first-seen link order.
#[derive(Debug, Clone)]
pub struct ScoutRun {
    pub run_id: Uuid,
    pub records: Vec<RatingActionRecord>,
    pub stats: RunStats,
}

pub struct RatingsScout<S: BrowserSession> {
    navigator: PageNavigator<S>,
    lister: RowLister,
    reader: DetailReader,
    extractor: RecordExtractor,
    search_url: Url,
    page_timeout: std::time::Duration,
}

impl<S: BrowserSession> RatingsScout<S> {
    pub fn new(session: S, config: &ScoutConfig) -> Result<Self, RatewatchError> {
        Self::with_query(session, config, &SearchQuery::default())
    }

    pub fn with_query(
        session: S,
        config: &ScoutConfig,
        query: &SearchQuery,
    ) -> Result<Self, RatewatchError> {
        let site_url = Url::parse(&config.site_url)
            .map_err(|e| RatewatchError::Config(format!("RATEWATCH_SITE_URL: {e}")))?;
        let search_url = query
            .url(&site_url)
            .map_err(|e| RatewatchError::Config(format!("search URL: {e}")))?;

        Ok(Self {
            navigator: PageNavigator::new(session),
            lister: RowLister::new(site_url, LeadingRowPolicy::new(config.skip_leading_rows)),
            reader: DetailReader::new(config.page_timeout, config.table_timeout),
            extractor: RecordExtractor::standard(),
            search_url,
            page_timeout: config.page_timeout,
        })
    }

    pub fn search_url(&self) -> &Url {
        &self.search_url
    }

    /// Run once and release the browser session, whatever the outcome.
    pub async fn run(mut self) -> Result<ScoutRun, ScoutError> {
        let mut ctx = RunContext::new();
        let span = info_span!("scout_run", run_id = %ctx.run_id, browser = self.navigator.session().name());

        async move {
            info!(search_url = self.search_url.as_str(), "Scout run starting");
            let result = self.run_inner(&mut ctx).await;

            if let Err(e) = self.navigator.close().await {
                warn!(error = %e, "Failed to close browser session");
            }

            let elapsed = Utc::now() - ctx.started_at;
            match &result {
                Ok(()) => info!(elapsed_ms = elapsed.num_milliseconds(), "Scout run complete. {}", ctx.stats),
                Err(e) => warn!(
                    error = %e,
                    kept = ctx.records.len(),
                    elapsed_ms = elapsed.num_milliseconds(),
                    "Scout run aborted"
                ),
            }

            result.map(|()| ScoutRun {
                run_id: ctx.run_id,
                records: ctx.records,
                stats: ctx.stats,
            })
        }
        .instrument(span)
        .await
    }

    async fn run_inner(&mut self, ctx: &mut RunContext) -> Result<(), ScoutError> {
        let search_url = self.search_url.to_string();
        self.navigator
            .navigate(&search_url, site::RESULTS_CONTAINER, self.page_timeout)
            .await
            .map_err(ScoutError::FatalListing)?;

        let listed = self
            .lister
            .list(self.navigator.session())
            .map_err(ScoutError::FatalListing)?;

        ctx.stats.blocks_listed = listed.blocks as u32;
        ctx.stats.leading_skipped = listed.leading_skipped as u32;
        ctx.stats.rows_off_topic = listed.off_topic as u32;
        ctx.stats.rows_malformed = listed.malformed as u32;
        ctx.stats.candidates = listed.candidates.len() as u32;

        for candidate in &listed.candidates {
            if !ctx.dedup.admit_link(&candidate.link) {
                info!(link = candidate.link.as_str(), "Duplicate link skipped");
                ctx.stats.duplicate_links += 1;
                continue;
            }

            let outcome = self.process(ctx, candidate).await;
            if let ItemOutcome::Skipped(reason) = &outcome {
                warn!(link = candidate.link.as_str(), %reason, "Candidate skipped");
            }
            ctx.record(outcome);
        }

        Ok(())
    }

    /// Fetch, parse and admit one candidate. Any detail failure, including a
    /// lost backend, skips only this candidate.
    async fn process(&mut self, ctx: &mut RunContext, candidate: &Candidate) -> ItemOutcome {
        ctx.stats.details_fetched += 1;
        let page = match self.reader.read(&mut self.navigator, &candidate.link).await {
            Ok(page) => page,
            Err(e) => return ItemOutcome::Skipped(SkipReason::DetailUnavailable(e.to_string())),
        };

        let record = self
            .extractor
            .extract(&page, &candidate.date, &candidate.link);

        if !record.has_company() {
            return ItemOutcome::Skipped(SkipReason::MissingCompany);
        }
        if !ctx.dedup.admit_record(&record) {
            return ItemOutcome::Skipped(SkipReason::DuplicateRecord);
        }

        info!(
            company = record.company.as_str(),
            action = %record.action,
            agency = %record.agency,
            "Record accepted"
        );
        ItemOutcome::Accepted(record)
    }
}
