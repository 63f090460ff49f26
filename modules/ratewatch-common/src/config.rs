use std::env;
use std::time::Duration;

use crate::error::RatewatchError;

pub const DEFAULT_SITE_URL: &str = "https://www.fitchratings.com";
pub const DEFAULT_PAGE_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_TABLE_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_SKIP_LEADING_ROWS: usize = 1;

/// Scout configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ScoutConfig {
    // Browser
    pub browserless_url: Option<String>,
    pub browserless_token: Option<String>,
    pub chrome_bin: String,

    // Site
    pub site_url: String,

    // Timeouts
    pub page_timeout: Duration,
    pub table_timeout: Duration,

    // Listing
    pub skip_leading_rows: usize,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            browserless_url: None,
            browserless_token: None,
            chrome_bin: "chromium".to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            page_timeout: Duration::from_millis(DEFAULT_PAGE_TIMEOUT_MS),
            table_timeout: Duration::from_millis(DEFAULT_TABLE_TIMEOUT_MS),
            skip_leading_rows: DEFAULT_SKIP_LEADING_ROWS,
        }
    }
}

impl ScoutConfig {
    /// Load configuration from the environment (and a `.env` file if present).
    pub fn from_env() -> Result<Self, RatewatchError> {
        dotenvy::dotenv().ok();

        let config = Self {
            browserless_url: non_empty_env("BROWSERLESS_URL"),
            browserless_token: non_empty_env("BROWSERLESS_TOKEN"),
            chrome_bin: env::var("CHROME_BIN").unwrap_or_else(|_| "chromium".to_string()),
            site_url: env::var("RATEWATCH_SITE_URL")
                .unwrap_or_else(|_| DEFAULT_SITE_URL.to_string()),
            page_timeout: Duration::from_millis(parse_env(
                "PAGE_TIMEOUT_MS",
                DEFAULT_PAGE_TIMEOUT_MS,
            )?),
            table_timeout: Duration::from_millis(parse_env(
                "TABLE_TIMEOUT_MS",
                DEFAULT_TABLE_TIMEOUT_MS,
            )?),
            skip_leading_rows: parse_env("SKIP_LEADING_ROWS", DEFAULT_SKIP_LEADING_ROWS)?,
        };

        config.log_keys();
        Ok(config)
    }

    fn log_keys(&self) {
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) if !v.is_empty() => {
                    let n = v.len().min(5);
                    format!("{}...({} chars)", &v[..n], v.len())
                }
                _ => "<not set>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!(
            "  BROWSERLESS_URL: {}",
            self.browserless_url.as_deref().unwrap_or("<not set>")
        );
        tracing::info!("  BROWSERLESS_TOKEN: {}", preview_opt(&self.browserless_token));
        tracing::info!("  CHROME_BIN: {}", self.chrome_bin);
        tracing::info!("  RATEWATCH_SITE_URL: {}", self.site_url);
        tracing::info!("  PAGE_TIMEOUT_MS: {}", self.page_timeout.as_millis());
        tracing::info!("  TABLE_TIMEOUT_MS: {}", self.table_timeout.as_millis());
        tracing::info!("  SKIP_LEADING_ROWS: {}", self.skip_leading_rows);
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, RatewatchError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| RatewatchError::Config(format!("{key} must be a number, got {raw:?}"))),
        _ => Ok(default),
    }
}
