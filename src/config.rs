//! Environment-backed configuration.

use std::env;
use std::path::PathBuf;

pub const DEFAULT_PRICE_SOURCE_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Clone)]
pub struct Config {
    /// Instrument symbol in the price source's notation.
    pub symbol: String,
    /// Scheduled scan cadence. 0 disables the scheduler.
    pub scan_interval_minutes: u64,
    pub port: u16,
    /// Base URL of the chart API, overridable for tests.
    pub price_source_url: String,
    /// Alert webhook endpoint; alerts are skipped when unset.
    pub webhook_url: Option<String>,
    /// Where manually pinned levels are persisted across restarts.
    pub levels_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            symbol: "^NSEBANK".to_string(),
            scan_interval_minutes: 15,
            port: 8080,
            price_source_url: DEFAULT_PRICE_SOURCE_URL.to_string(),
            webhook_url: None,
            levels_file: None,
        }
    }
}

impl Config {
    /// Read configuration from the environment, falling back to defaults
    /// for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            symbol: env::var("SYMBOL").ok().filter(|v| !v.is_empty()).unwrap_or(defaults.symbol),
            scan_interval_minutes: env::var("SCAN_INTERVAL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.scan_interval_minutes),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            price_source_url: env::var("PRICE_SOURCE_URL")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.price_source_url),
            webhook_url: env::var("ALERT_WEBHOOK_URL").ok().filter(|v| !v.is_empty()),
            levels_file: env::var("LEVELS_FILE")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }
}

/// Deployment environment name; selects the log output format.
pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}
