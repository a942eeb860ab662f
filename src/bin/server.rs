//! Levelwatch Scanner Service
//!
//! Runs the periodic breakout scanner and the HTTP control surface in one
//! process. The scheduler survives transient failures; the control
//! surface exposes status, history, and manual triggers.

use dotenvy::dotenv;
use levelwatch::config::{self, Config};
use levelwatch::core::http::{start_server, AppState};
use levelwatch::core::scanner::Scanner;
use levelwatch::core::scheduler::ScanScheduler;
use levelwatch::logging;
use levelwatch::metrics::Metrics;
use levelwatch::services::notifier::{Notifier, WebhookNotifier};
use levelwatch::services::price_source::PriceSource;
use levelwatch::services::store::LevelsStore;
use levelwatch::services::yahoo::YahooPriceSource;
use std::sync::Arc;
use std::time::Instant;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let config = Config::from_env();
    info!("Starting Levelwatch Scanner");
    info!(environment = %config::get_environment(), "Environment");
    info!(
        symbol = %config.symbol,
        interval_minutes = config.scan_interval_minutes,
        port = config.port,
        "Configuration loaded"
    );

    let metrics = Arc::new(Metrics::new()?);

    let price_source: Arc<dyn PriceSource> =
        Arc::new(YahooPriceSource::with_base_url(config.price_source_url.clone()));
    let notifier: Arc<dyn Notifier> = Arc::new(WebhookNotifier::new(config.webhook_url.clone()));
    if !notifier.is_configured() {
        warn!("ALERT_WEBHOOK_URL not set, breakout alerts will not be delivered");
    }

    let mut scanner =
        Scanner::new(&config, price_source, notifier.clone()).with_metrics(metrics.clone());
    if let Some(path) = &config.levels_file {
        scanner = scanner.with_store(LevelsStore::new(path.clone()));
    }
    let scanner = Arc::new(scanner);

    // Initial level refresh and scan; failures are logged, not fatal.
    scanner.bootstrap().await;

    let scheduler = if config.scan_interval_minutes > 0 {
        let scheduler = ScanScheduler::new(scanner.clone(), config.scan_interval_minutes)?;
        scheduler.start().await;
        Some(scheduler)
    } else {
        info!("Scheduled scans disabled (SCAN_INTERVAL_MINUTES is 0)");
        None
    };

    let state = AppState {
        scanner: scanner.clone(),
        history: scanner.history().clone(),
        notifier,
        metrics,
        start_time: Arc::new(Instant::now()),
    };
    let port = config.port;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(port, state).await {
            error!(error = %e, "HTTP server error");
        }
    });

    info!("Scanner started, waiting for shutdown signal...");
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down...");
            if let Some(scheduler) = &scheduler {
                scheduler.stop().await;
            }
            info!("Scanner stopped");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    Ok(())
}
