use std::collections::HashSet;

use ratewatch_common::{RatingActionRecord, RecordKey};

/// Run-scoped duplicate suppression: links before fetching, record keys
/// after parsing.
#[derive(Debug, Default)]
pub struct Deduplicator {
    links: HashSet<String>,
    records: HashSet<RecordKey>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True the first time `link` is offered.
    pub fn admit_link(&mut self, link: &str) -> bool {
        self.links.insert(link.to_string())
    }

    /// True the first time the record's `(company, ratingCurrent, action)` is offered.
    pub fn admit_record(&mut self, record: &RatingActionRecord) -> bool {
        self.records.insert(record.key())
    }
}
