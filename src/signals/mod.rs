//! Breakout detection and the signal log.

pub mod engine;
pub mod history;

pub use engine::{BreakState, SignalEngine};
pub use history::SignalHistory;
