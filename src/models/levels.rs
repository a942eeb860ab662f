//! Previous-session reference levels.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Previous trading session's high/low as reported by the price source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionLevels {
    pub high: f64,
    pub low: f64,
    pub as_of: NaiveDate,
}

impl SessionLevels {
    /// `high >= low`. Equality is a degenerate but valid session; an
    /// inverted pair is bad source data.
    pub fn is_ordered(&self) -> bool {
        self.high >= self.low
    }
}

/// Where a price sits relative to the reference range. Boundary equality
/// counts as inside the range; a breakout requires strict inequality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RangePosition {
    AbovePreviousHigh,
    BelowPreviousLow,
    WithinRange,
}

/// Reference levels held by the scanner between refreshes. Replaced
/// wholesale on every successful refresh, never partially updated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLevels {
    pub high: f64,
    pub low: f64,
    pub as_of: NaiveDate,
    pub fetched_at: DateTime<Utc>,
}

impl ReferenceLevels {
    pub fn from_session(session: SessionLevels, fetched_at: DateTime<Utc>) -> Self {
        Self {
            high: session.high,
            low: session.low,
            as_of: session.as_of,
            fetched_at,
        }
    }

    pub fn position_of(&self, price: f64) -> RangePosition {
        if price > self.high {
            RangePosition::AbovePreviousHigh
        } else if price < self.low {
            RangePosition::BelowPreviousLow
        } else {
            RangePosition::WithinRange
        }
    }

    /// True when `other` carries the same breakout thresholds. Armed state
    /// is level-relative, so a threshold change invalidates it.
    pub fn same_thresholds(&self, other: &ReferenceLevels) -> bool {
        self.high == other.high && self.low == other.low
    }
}
