//! Breakout signal state machine.
//!
//! Tracks whether the current breakout episode has already produced a
//! signal, so a level that stays broken fires exactly once until price
//! returns inside the reference range and breaks out again.

use crate::error::ScanError;
use crate::models::{Direction, PriceSample, RangePosition, ReferenceLevels, Signal};

/// Per-instrument armed state. At most one side is armed at a time: a new
/// breakout in the opposite direction re-arms directly without passing
/// through the disarmed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BreakState {
    #[default]
    None,
    BuyArmed,
    SellArmed,
}

#[derive(Debug, Default)]
pub struct SignalEngine {
    state: BreakState,
}

impl SignalEngine {
    pub fn new() -> Self {
        Self {
            state: BreakState::None,
        }
    }

    pub fn state(&self) -> BreakState {
        self.state
    }

    /// Drop any armed state. Called when the reference levels are replaced
    /// with different thresholds; armed state is level-relative and stale
    /// levels invalidate it.
    pub fn reset(&mut self) {
        self.state = BreakState::None;
    }

    /// Feed one price sample through the state machine.
    ///
    /// Returns the newly fired signal, or `None` when the sample is inside
    /// the range or the breakout was already signaled this episode. With no
    /// levels loaded this fails with `LevelsNotReady` and leaves the state
    /// untouched.
    pub fn evaluate(
        &mut self,
        sample: &PriceSample,
        levels: Option<&ReferenceLevels>,
    ) -> Result<Option<Signal>, ScanError> {
        let levels = levels.ok_or(ScanError::LevelsNotReady)?;

        let fired = match levels.position_of(sample.price) {
            RangePosition::AbovePreviousHigh => {
                if self.state == BreakState::BuyArmed {
                    None
                } else {
                    self.state = BreakState::BuyArmed;
                    Some(Signal::new(Direction::Buy, sample, levels.high, *levels))
                }
            }
            RangePosition::BelowPreviousLow => {
                if self.state == BreakState::SellArmed {
                    None
                } else {
                    self.state = BreakState::SellArmed;
                    Some(Signal::new(Direction::Sell, sample, levels.low, *levels))
                }
            }
            RangePosition::WithinRange => {
                self.state = BreakState::None;
                None
            }
        };

        Ok(fired)
    }
}
