//! Prometheus metrics for scan cycles and the HTTP surface.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry, TextEncoder,
};

pub struct Metrics {
    registry: Registry,
    pub http_requests_total: IntCounter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_in_flight: IntGauge,
    pub scans_total: IntCounter,
    pub scan_errors_total: IntCounter,
    pub signals_total: IntCounter,
    pub level_refreshes_total: IntCounter,
    pub levels_loaded: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = IntCounter::with_opts(Opts::new(
            "http_requests_total",
            "Total HTTP requests served",
        ))?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;
        let http_requests_in_flight = IntGauge::with_opts(Opts::new(
            "http_requests_in_flight",
            "HTTP requests currently being served",
        ))?;
        let scans_total = IntCounter::with_opts(Opts::new(
            "scans_total",
            "Completed scan cycles, successful or failed",
        ))?;
        let scan_errors_total = IntCounter::with_opts(Opts::new(
            "scan_errors_total",
            "Scan cycles that ended in an error",
        ))?;
        let signals_total = IntCounter::with_opts(Opts::new(
            "signals_total",
            "Breakout signals emitted",
        ))?;
        let level_refreshes_total = IntCounter::with_opts(Opts::new(
            "level_refreshes_total",
            "Successful reference level refreshes",
        ))?;
        let levels_loaded = IntGauge::with_opts(Opts::new(
            "levels_loaded",
            "Whether reference levels are currently loaded (0/1)",
        ))?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(scans_total.clone()))?;
        registry.register(Box::new(scan_errors_total.clone()))?;
        registry.register(Box::new(signals_total.clone()))?;
        registry.register(Box::new(level_refreshes_total.clone()))?;
        registry.register(Box::new(levels_loaded.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            scans_total,
            scan_errors_total,
            signals_total,
            level_refreshes_total,
            levels_loaded,
        })
    }

    /// Render the registry in the Prometheus text exposition format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
