//! Price source interface for live quotes and session levels.

use crate::error::ScanError;
use crate::models::{PriceSample, SessionLevels};
use async_trait::async_trait;

#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Latest traded price for the instrument.
    async fn fetch_current_price(&self, symbol: &str) -> Result<PriceSample, ScanError>;

    /// High/low of the previous complete trading session.
    async fn fetch_previous_session_levels(&self, symbol: &str)
        -> Result<SessionLevels, ScanError>;
}
