//! Cron-driven scheduler for periodic scan cycles.

use crate::core::scanner::Scanner;
use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Drives `Scanner::run_scheduled` on a fixed interval.
///
/// A failed cycle never stops the loop: the scanner records the error and
/// the next tick proceeds normally.
pub struct ScanScheduler {
    scanner: Arc<Scanner>,
    schedule: Schedule,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl ScanScheduler {
    /// Build a scheduler ticking every `interval_minutes`.
    pub fn new(
        scanner: Arc<Scanner>,
        interval_minutes: u64,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        if interval_minutes == 0 {
            return Err("scheduler disabled: scan interval is 0".into());
        }

        // Cron format: second minute hour day month weekday
        let cron_expr = if interval_minutes >= 60 {
            format!("0 0 */{} * * *", interval_minutes / 60)
        } else {
            format!("0 */{} * * * *", interval_minutes)
        };

        let schedule = Schedule::from_str(&cron_expr)
            .map_err(|e| format!("invalid cron expression '{}': {}", cron_expr, e))?;

        info!(interval_minutes, cron = %cron_expr, "scan scheduler created");

        Ok(Self {
            scanner,
            schedule,
            handle: Arc::new(RwLock::new(None)),
        })
    }

    pub async fn start(&self) {
        let scanner = self.scanner.clone();
        let schedule = self.schedule.clone();

        let handle = tokio::spawn(async move {
            info!("scan scheduler started, waiting for first tick");

            loop {
                let mut upcoming = schedule.upcoming(chrono::Utc);
                if let Some(next_tick) = upcoming.next() {
                    let now = chrono::Utc::now();
                    if next_tick > now {
                        let wait = (next_tick - now).to_std().unwrap_or_default();
                        tokio::time::sleep(wait).await;
                    }
                } else {
                    tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
                    continue;
                }

                scanner.run_scheduled().await;
            }
        });

        let mut h = self.handle.write().await;
        *h = Some(handle);
    }

    pub async fn stop(&self) {
        let mut handle = self.handle.write().await;
        if let Some(h) = handle.take() {
            h.abort();
            info!("scan scheduler stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.handle.read().await.is_some()
    }
}
