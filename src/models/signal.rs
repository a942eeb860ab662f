//! Emitted breakout signals.

use crate::models::levels::ReferenceLevels;
use crate::models::price::PriceSample;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
        }
    }
}

/// Immutable record of one breakout. Appended to the history exactly once
/// and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub direction: Direction,
    pub price: f64,
    /// The reference level that was broken.
    pub trigger_level: f64,
    pub timestamp: DateTime<Utc>,
    /// Snapshot of the levels in force when the signal fired.
    pub session_levels: ReferenceLevels,
}

impl Signal {
    pub fn new(
        direction: Direction,
        sample: &PriceSample,
        trigger_level: f64,
        session_levels: ReferenceLevels,
    ) -> Self {
        Self {
            direction,
            price: sample.price,
            trigger_level,
            timestamp: sample.observed_at,
            session_levels,
        }
    }
}
