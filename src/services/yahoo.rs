//! Yahoo Finance chart-API price source.
//!
//! Daily bars supply the previous session's high/low; the chart metadata
//! supplies the current price. Transient request failures are retried with
//! exponential backoff before the scan cycle gives up.

use crate::config::DEFAULT_PRICE_SOURCE_URL;
use crate::error::ScanError;
use crate::models::{PriceSample, SessionLevels};
use crate::services::price_source::PriceSource;
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

// Yahoo rejects requests without a browser user agent.
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0";

const MAX_RETRIES: usize = 3;

pub struct YahooPriceSource {
    base_url: String,
    client: reqwest::Client,
}

impl YahooPriceSource {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_PRICE_SOURCE_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Inject a base URL and client, used by tests to point at a mock
    /// server.
    pub fn with_client(base_url: String, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    async fn fetch_chart(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<ChartResult, ScanError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);

        let request = || async {
            self.client
                .get(&url)
                .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
                .query(&[("range", range), ("interval", interval)])
                .send()
                .await?
                .error_for_status()?
                .json::<ChartResponse>()
                .await
        };

        let response = request
            .retry(ExponentialBuilder::default().with_max_times(MAX_RETRIES))
            .notify(|err: &reqwest::Error, delay: Duration| {
                warn!(
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "price source request failed, retrying"
                );
            })
            .await
            .map_err(|e| ScanError::SourceUnavailable(e.to_string()))?;

        response
            .chart
            .result
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| ScanError::SourceUnavailable(format!("empty chart result for {symbol}")))
    }
}

impl Default for YahooPriceSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceSource for YahooPriceSource {
    async fn fetch_current_price(&self, symbol: &str) -> Result<PriceSample, ScanError> {
        let result = self.fetch_chart(symbol, "1d", "1m").await?;

        let price = result.meta.regular_market_price.ok_or_else(|| {
            ScanError::SourceUnavailable(format!("no market price in chart response for {symbol}"))
        })?;
        let observed_at = result
            .meta
            .regular_market_time
            .and_then(|t| DateTime::from_timestamp(t, 0))
            .unwrap_or_else(Utc::now);

        debug!(symbol = %symbol, price, "fetched current price");
        Ok(PriceSample { price, observed_at })
    }

    async fn fetch_previous_session_levels(
        &self,
        symbol: &str,
    ) -> Result<SessionLevels, ScanError> {
        let result = self.fetch_chart(symbol, "5d", "1d").await?;

        let timestamps = result.timestamp.unwrap_or_default();
        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| {
                ScanError::SourceUnavailable(format!("no quote data in chart response for {symbol}"))
            })?;

        // Daily bars with a missing high or low are gaps in the feed, not
        // tradable sessions.
        let mut sessions: Vec<(NaiveDate, f64, f64)> = Vec::new();
        for (idx, ts) in timestamps.iter().enumerate() {
            let high = quote.high.get(idx).copied().flatten();
            let low = quote.low.get(idx).copied().flatten();
            let date = DateTime::from_timestamp(*ts, 0).map(|dt| dt.date_naive());
            if let (Some(high), Some(low), Some(date)) = (high, low, date) {
                sessions.push((date, high, low));
            }
        }

        // The last bar is usually today's running session; the previous
        // complete session is the newest bar dated strictly before today.
        let today = Utc::now().date_naive();
        let (as_of, high, low) = sessions
            .into_iter()
            .rev()
            .find(|(date, _, _)| *date < today)
            .ok_or_else(|| {
                ScanError::SourceUnavailable(format!(
                    "no completed session in chart response for {symbol}"
                ))
            })?;

        debug!(symbol = %symbol, high, low, as_of = %as_of, "fetched previous session levels");
        Ok(SessionLevels { high, low, as_of })
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
    regular_market_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
}
