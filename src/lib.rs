//! Levelwatch, a previous-session high/low breakout scanner.
//!
//! Polls a market price source on a fixed cadence, compares the latest
//! price against the previous trading session's high and low, and emits a
//! directional signal exactly once per breakout episode. Repeated alerts
//! are suppressed while price stays beyond an already-signaled level.

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;
