use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ratewatch_common::ScoutConfig;
use ratewatch_scout::browser::{BrowserSession, BrowserlessSession, ChromeSession};
use ratewatch_scout::output::{JsonSink, RecordSink};
use ratewatch_scout::pipeline::{RatingsScout, ScoutRun};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// Browserless when BROWSERLESS_URL is set, local Chrome otherwise.
    Auto,
    Browserless,
    Chrome,
}

#[derive(Parser)]
#[command(name = "ratewatch-scout", about = "Harvest last week's national-scale rating actions")]
struct Cli {
    /// Write records to this file instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Backend::Auto)]
    backend: Backend,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::from_default_env().add_directive("ratewatch=info".parse()?);
    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    info!("Ratewatch scout starting...");

    let config = ScoutConfig::from_env().context("Invalid configuration")?;

    let run = match (cli.backend, config.browserless_url.as_deref()) {
        (Backend::Browserless, None) => bail!("--backend browserless requires BROWSERLESS_URL"),
        (Backend::Auto | Backend::Browserless, Some(url)) => {
            let session = BrowserlessSession::new(url, config.browserless_token.as_deref());
            scout(session, &config).await?
        }
        (Backend::Auto, None) | (Backend::Chrome, _) => {
            scout(ChromeSession::new(&config.chrome_bin), &config).await?
        }
    };

    let sink = match cli.output {
        Some(path) => JsonSink::file(path),
        None => JsonSink::stdout(),
    };
    sink.deliver(&run.records)?;

    info!(run_id = %run.run_id, records = run.records.len(), "Done");
    Ok(())
}

async fn scout<S: BrowserSession>(session: S, config: &ScoutConfig) -> Result<ScoutRun> {
    let run = RatingsScout::new(session, config)?.run().await?;
    Ok(run)
}
