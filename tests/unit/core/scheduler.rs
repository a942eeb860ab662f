//! Unit tests for the scan scheduler

use async_trait::async_trait;
use chrono::NaiveDate;
use levelwatch::config::Config;
use levelwatch::core::scanner::Scanner;
use levelwatch::core::scheduler::ScanScheduler;
use levelwatch::error::ScanError;
use levelwatch::models::{PriceSample, SessionLevels};
use levelwatch::services::notifier::Notifier;
use levelwatch::services::price_source::PriceSource;
use std::sync::Arc;

struct FixedPriceSource;

#[async_trait]
impl PriceSource for FixedPriceSource {
    async fn fetch_current_price(&self, _symbol: &str) -> Result<PriceSample, ScanError> {
        Ok(PriceSample::new(47_800.0))
    }

    async fn fetch_previous_session_levels(
        &self,
        _symbol: &str,
    ) -> Result<SessionLevels, ScanError> {
        Ok(SessionLevels {
            high: 48_000.0,
            low: 47_500.0,
            as_of: NaiveDate::from_ymd_opt(2024, 6, 14).unwrap(),
        })
    }
}

struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn send(&self, _signal: &levelwatch::models::Signal) -> Result<(), ScanError> {
        Ok(())
    }

    async fn send_test(&self) -> Result<(), ScanError> {
        Ok(())
    }

    fn is_configured(&self) -> bool {
        false
    }
}

fn test_scanner() -> Arc<Scanner> {
    Arc::new(Scanner::new(
        &Config::default(),
        Arc::new(FixedPriceSource),
        Arc::new(NullNotifier),
    ))
}

#[tokio::test]
async fn zero_interval_is_rejected() {
    assert!(ScanScheduler::new(test_scanner(), 0).is_err());
}

#[tokio::test]
async fn minute_and_hour_intervals_build() {
    assert!(ScanScheduler::new(test_scanner(), 15).is_ok());
    assert!(ScanScheduler::new(test_scanner(), 59).is_ok());
    assert!(ScanScheduler::new(test_scanner(), 60).is_ok());
    assert!(ScanScheduler::new(test_scanner(), 120).is_ok());
}

#[tokio::test]
async fn scheduler_lifecycle() {
    let scheduler = ScanScheduler::new(test_scanner(), 15).unwrap();
    assert!(!scheduler.is_running().await);

    scheduler.start().await;
    assert!(scheduler.is_running().await);

    scheduler.stop().await;
    assert!(!scheduler.is_running().await);
}
