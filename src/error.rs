//! Error taxonomy for scan cycles and alert delivery.
//!
//! Every variant is recoverable: the scheduler keeps ticking through all of
//! them, and each maps to a distinct response code on the control surface.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    /// The external price source could not be reached or returned data we
    /// cannot use. Retried on the next tick or manual trigger.
    #[error("price source unavailable: {0}")]
    SourceUnavailable(String),

    /// No reference levels are loaded yet; a successful refresh resolves
    /// this. Absent levels are never treated as zero levels.
    #[error("reference levels not loaded")]
    LevelsNotReady,

    /// Another scan or refresh holds the per-instrument critical section.
    /// The trigger is rejected, not queued.
    #[error("scan already in progress")]
    ScanInProgress,

    /// Alert delivery failed after the signal was already recorded. The
    /// history entry stands; delivery is best-effort.
    #[error("alert delivery failed: {0}")]
    DeliveryFailed(String),
}

impl ScanError {
    /// Stable machine-readable code, used in status reports and API bodies.
    pub fn code(&self) -> &'static str {
        match self {
            ScanError::SourceUnavailable(_) => "SOURCE_UNAVAILABLE",
            ScanError::LevelsNotReady => "LEVELS_NOT_READY",
            ScanError::ScanInProgress => "SCAN_IN_PROGRESS",
            ScanError::DeliveryFailed(_) => "DELIVERY_FAILED",
        }
    }
}
