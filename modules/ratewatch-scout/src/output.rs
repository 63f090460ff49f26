//! Hand-off of a finished run to the report renderer.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use ratewatch_common::RatingActionRecord;

/// Receives the whole batch of records once a run completes.
pub trait RecordSink {
    fn deliver(&self, records: &[RatingActionRecord]) -> Result<()>;
}

/// Writes the batch as a pretty-printed JSON array.
#[derive(Debug, Clone)]
pub enum JsonSink {
    Stdout,
    File(PathBuf),
}

impl JsonSink {
    pub fn stdout() -> Self {
        JsonSink::Stdout
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        JsonSink::File(path.into())
    }
}

impl RecordSink for JsonSink {
    fn deliver(&self, records: &[RatingActionRecord]) -> Result<()> {
        let json = serde_json::to_string_pretty(records).context("Failed to serialize records")?;

        match self {
            JsonSink::Stdout => {
                let mut out = std::io::stdout().lock();
                writeln!(out, "{json}").context("Failed to write records to stdout")?;
            }
            JsonSink::File(path) => {
                if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                    std::fs::create_dir_all(dir)
                        .with_context(|| format!("Failed to create {}", dir.display()))?;
                }
                std::fs::write(path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!(path = %path.display(), records = records.len(), "Records written");
            }
        }
        Ok(())
    }
}
