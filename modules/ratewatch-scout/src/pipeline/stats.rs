use serde::Serialize;

/// Stats from one scout run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub blocks_listed: u32,
    pub leading_skipped: u32,
    pub rows_off_topic: u32,
    pub rows_malformed: u32,
    pub candidates: u32,
    pub duplicate_links: u32,
    pub details_fetched: u32,
    pub details_failed: u32,
    pub missing_company: u32,
    pub duplicate_records: u32,
    pub records_kept: u32,
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Ratewatch Run Complete ===")?;
        writeln!(f, "Result blocks:      {}", self.blocks_listed)?;
        writeln!(f, "Leading skipped:    {}", self.leading_skipped)?;
        writeln!(f, "Off-topic rows:     {}", self.rows_off_topic)?;
        writeln!(f, "Malformed rows:     {}", self.rows_malformed)?;
        writeln!(f, "Candidates:         {}", self.candidates)?;
        writeln!(f, "Duplicate links:    {}", self.duplicate_links)?;
        writeln!(f, "Details fetched:    {}", self.details_fetched)?;
        writeln!(f, "Details failed:     {}", self.details_failed)?;
        writeln!(f, "Missing company:    {}", self.missing_company)?;
        writeln!(f, "Duplicate records:  {}", self.duplicate_records)?;
        write!(f, "Records kept:       {}", self.records_kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_kept_records_last() {
        let stats = RunStats {
            records_kept: 3,
            ..Default::default()
        };
        let summary = stats.to_string();
        assert!(summary.contains("=== Ratewatch Run Complete ==="));
        assert!(summary.trim_end().ends_with("Records kept:       3"));
    }
}
