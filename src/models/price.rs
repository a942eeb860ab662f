//! Live price samples.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observation of the instrument's price. Produced once per scan
/// cycle and consumed immediately; not retained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub price: f64,
    pub observed_at: DateTime<Utc>,
}

impl PriceSample {
    pub fn new(price: f64) -> Self {
        Self {
            price,
            observed_at: Utc::now(),
        }
    }
}
