//! Scan orchestration for a single instrument.
//!
//! One critical section guards the whole fetch-evaluate-record-notify
//! cycle and any level replacement: only one of {scheduled scan, manual
//! scan, refresh, pin} runs at a time, and a trigger arriving while the
//! section is held is rejected with `ScanInProgress`, never queued. The
//! guard is taken before the price fetch begins, so overlapping scans are
//! impossible; status and history live behind their own locks, so readers
//! never wait on network latency.

use crate::config::Config;
use crate::error::ScanError;
use crate::metrics::Metrics;
use crate::models::{RangePosition, ReferenceLevels, SessionLevels, Signal};
use crate::services::notifier::Notifier;
use crate::services::price_source::PriceSource;
use crate::services::store::LevelsStore;
use crate::signals::engine::SignalEngine;
use crate::signals::history::SignalHistory;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScanState {
    Idle,
    Scanning,
}

/// Last price relative to the reference range.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MarketStatus {
    pub position: RangePosition,
    pub price: f64,
    pub distance_to_high: f64,
    pub distance_to_low: f64,
}

impl MarketStatus {
    fn of(levels: &ReferenceLevels, price: f64) -> Self {
        Self {
            position: levels.position_of(price),
            price,
            distance_to_high: levels.high - price,
            distance_to_low: price - levels.low,
        }
    }
}

/// Point-in-time snapshot of the scanner. Replaced wholesale on every
/// update so readers never see a mix of pre- and post-scan fields.
#[derive(Debug, Clone, Serialize)]
pub struct ScannerStatus {
    pub state: ScanState,
    pub symbol: String,
    pub scan_interval_minutes: u64,
    pub last_scan_at: Option<DateTime<Utc>>,
    pub last_price: Option<f64>,
    pub last_error: Option<String>,
    pub levels: Option<ReferenceLevels>,
    pub levels_loaded: bool,
    pub market: Option<MarketStatus>,
    pub alerts_configured: bool,
}

/// Result of one completed scan cycle, returned synchronously to manual
/// callers.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub price: f64,
    pub observed_at: DateTime<Utc>,
    pub signal: Option<Signal>,
    /// The signal was recorded but the alert could not be delivered.
    pub delivery_failed: bool,
}

/// Engine state and held levels, touched only while the scan guard is
/// held.
struct ScanCore {
    engine: SignalEngine,
    levels: Option<ReferenceLevels>,
}

pub struct Scanner {
    symbol: String,
    price_source: Arc<dyn PriceSource>,
    notifier: Arc<dyn Notifier>,
    history: Arc<SignalHistory>,
    metrics: Option<Arc<Metrics>>,
    store: Option<LevelsStore>,
    core: Mutex<ScanCore>,
    status: RwLock<ScannerStatus>,
}

impl Scanner {
    pub fn new(
        config: &Config,
        price_source: Arc<dyn PriceSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let status = ScannerStatus {
            state: ScanState::Idle,
            symbol: config.symbol.clone(),
            scan_interval_minutes: config.scan_interval_minutes,
            last_scan_at: None,
            last_price: None,
            last_error: None,
            levels: None,
            levels_loaded: false,
            market: None,
            alerts_configured: notifier.is_configured(),
        };

        Self {
            symbol: config.symbol.clone(),
            price_source,
            notifier,
            history: Arc::new(SignalHistory::new()),
            metrics: None,
            store: None,
            core: Mutex::new(ScanCore {
                engine: SignalEngine::new(),
                levels: None,
            }),
            status: RwLock::new(status),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_store(mut self, store: LevelsStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn history(&self) -> &Arc<SignalHistory> {
        &self.history
    }

    /// Startup sequence: reload pinned levels, attempt a source refresh,
    /// run one scan. Every step is allowed to fail without aborting boot.
    pub async fn bootstrap(&self) {
        if let Some(store) = &self.store {
            if let Some(saved) = store.load() {
                let mut core = self.core.lock().await;
                core.engine.reset();
                core.levels = Some(saved);
                self.publish_levels(&core).await;
                info!(
                    high = saved.high,
                    low = saved.low,
                    as_of = %saved.as_of,
                    "restored pinned reference levels from disk"
                );
            }
        }

        if let Err(e) = self.refresh_levels().await {
            warn!(code = e.code(), error = %e, "initial level refresh failed");
        }

        self.run_scheduled().await;
    }

    /// One scan cycle on behalf of the periodic timer. Failures are
    /// recorded in status and logged; the scheduler always survives them.
    pub async fn run_scheduled(&self) {
        match self.run_scan().await {
            Ok(outcome) => match &outcome.signal {
                Some(signal) => {
                    info!(
                        direction = %signal.direction,
                        price = signal.price,
                        trigger_level = signal.trigger_level,
                        "scheduled scan emitted signal"
                    );
                }
                None => {
                    debug!(price = outcome.price, "scheduled scan complete, no signal");
                }
            },
            Err(e) => {
                warn!(code = e.code(), error = %e, "scheduled scan failed");
            }
        }
    }

    /// One scan cycle on behalf of an out-of-band caller; the outcome is
    /// returned synchronously.
    pub async fn run_manual(&self) -> Result<ScanOutcome, ScanError> {
        self.run_scan().await
    }

    async fn run_scan(&self) -> Result<ScanOutcome, ScanError> {
        // Rejected triggers leave status untouched.
        let mut core = self
            .core
            .try_lock()
            .map_err(|_| ScanError::ScanInProgress)?;

        self.status.write().await.state = ScanState::Scanning;

        let result = self.scan_cycle(&mut core).await;
        self.publish_scan_result(&core, &result).await;

        if let Some(metrics) = &self.metrics {
            metrics.scans_total.inc();
            if result.is_err() {
                metrics.scan_errors_total.inc();
            }
        }

        result
    }

    async fn scan_cycle(&self, core: &mut ScanCore) -> Result<ScanOutcome, ScanError> {
        let sample = self.price_source.fetch_current_price(&self.symbol).await?;

        let signal = core.engine.evaluate(&sample, core.levels.as_ref())?;

        let mut delivery_failed = false;
        if let Some(signal) = &signal {
            self.history.append(*signal).await;
            info!(
                direction = %signal.direction,
                price = signal.price,
                trigger_level = signal.trigger_level,
                "breakout signal emitted"
            );
            if let Some(metrics) = &self.metrics {
                metrics.signals_total.inc();
            }

            // The signal already happened; a failed alert must not roll
            // back the history entry.
            if let Err(e) = self.notifier.send(signal).await {
                warn!(error = %e, "alert delivery failed, signal retained in history");
                delivery_failed = true;
            }
        }

        Ok(ScanOutcome {
            price: sample.price,
            observed_at: sample.observed_at,
            signal,
            delivery_failed,
        })
    }

    /// Replace the reference levels from the price source. Mutually
    /// exclusive with an in-flight scan; on failure the held levels are
    /// unchanged and the error is reported, not swallowed.
    pub async fn refresh_levels(&self) -> Result<ReferenceLevels, ScanError> {
        let mut core = self
            .core
            .try_lock()
            .map_err(|_| ScanError::ScanInProgress)?;

        let session = match self
            .price_source
            .fetch_previous_session_levels(&self.symbol)
            .await
        {
            Ok(session) => session,
            Err(e) => {
                self.publish_refresh_error(&e).await;
                return Err(e);
            }
        };

        if !session.is_ordered() {
            let e = ScanError::SourceUnavailable(format!(
                "inconsistent session levels: high {} below low {}",
                session.high, session.low
            ));
            self.publish_refresh_error(&e).await;
            return Err(e);
        }

        let fresh = ReferenceLevels::from_session(session, Utc::now());
        let changed = self.install_levels(&mut core, fresh);

        if let Some(metrics) = &self.metrics {
            metrics.level_refreshes_total.inc();
        }
        info!(
            high = fresh.high,
            low = fresh.low,
            as_of = %fresh.as_of,
            changed,
            "reference levels refreshed"
        );
        self.publish_levels(&core).await;

        Ok(fresh)
    }

    /// Install operator-entered levels, bypassing the price source. Runs
    /// through the same critical section and reset rule as a refresh, and
    /// persists the pinned pair when a store is configured. The caller
    /// validates `high >= low`.
    pub async fn pin_levels(&self, session: SessionLevels) -> Result<ReferenceLevels, ScanError> {
        let mut core = self
            .core
            .try_lock()
            .map_err(|_| ScanError::ScanInProgress)?;

        let pinned = ReferenceLevels::from_session(session, Utc::now());
        self.install_levels(&mut core, pinned);

        if let Some(store) = &self.store {
            if let Err(e) = store.save(&pinned) {
                warn!(error = %e, "failed to persist pinned levels");
            }
        }

        info!(high = pinned.high, low = pinned.low, "reference levels pinned manually");
        self.publish_levels(&core).await;

        Ok(pinned)
    }

    /// Consistent snapshot of the scanner's state.
    pub async fn status(&self) -> ScannerStatus {
        self.status.read().await.clone()
    }

    /// Replace the held levels wholesale. Armed state is reset only when
    /// the thresholds actually changed; an identical pair preserves it.
    fn install_levels(&self, core: &mut ScanCore, fresh: ReferenceLevels) -> bool {
        let changed = core
            .levels
            .as_ref()
            .map_or(true, |held| !held.same_thresholds(&fresh));
        if changed {
            core.engine.reset();
        }
        core.levels = Some(fresh);
        changed
    }

    async fn publish_levels(&self, core: &ScanCore) {
        let mut status = self.status.write().await;
        status.levels = core.levels;
        status.levels_loaded = core.levels.is_some();
        if let Some(metrics) = &self.metrics {
            metrics.levels_loaded.set(i64::from(status.levels_loaded));
        }
    }

    async fn publish_refresh_error(&self, error: &ScanError) {
        let mut status = self.status.write().await;
        status.last_error = Some(format!("{}: {}", error.code(), error));
    }

    async fn publish_scan_result(
        &self,
        core: &ScanCore,
        result: &Result<ScanOutcome, ScanError>,
    ) {
        let mut status = self.status.write().await;
        status.state = ScanState::Idle;
        status.last_scan_at = Some(Utc::now());
        status.levels = core.levels;
        status.levels_loaded = core.levels.is_some();

        match result {
            Ok(outcome) => {
                status.last_price = Some(outcome.price);
                status.market = core.levels.map(|l| MarketStatus::of(&l, outcome.price));
                status.last_error = outcome
                    .delivery_failed
                    .then(|| "DELIVERY_FAILED: alert delivery failed".to_string());
            }
            Err(e) => {
                status.last_error = Some(format!("{}: {}", e.code(), e));
            }
        }
    }
}
