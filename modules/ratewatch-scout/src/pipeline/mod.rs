//! The extraction pipeline, from the search page to the accepted records.

pub mod dedup;
pub mod detail;
pub mod listing;
pub mod navigator;
pub mod orchestrator;
pub mod site;
pub mod stats;

pub use dedup::Deduplicator;
pub use detail::DetailReader;
pub use listing::{Candidate, LeadingRowPolicy, ListedRows, RowLister, TopicFilter};
pub use navigator::PageNavigator;
pub use orchestrator::{ItemOutcome, RatingsScout, RunContext, ScoutError, ScoutRun, SkipReason};
pub use site::SearchQuery;
pub use stats::RunStats;
