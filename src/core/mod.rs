//! Core application primitives: orchestration, scheduling, control surface.

pub mod http;
pub mod scanner;
pub mod scheduler;

pub use http::{create_router, start_server, AppState};
pub use scanner::{MarketStatus, ScanOutcome, ScanState, Scanner, ScannerStatus};
pub use scheduler::ScanScheduler;
