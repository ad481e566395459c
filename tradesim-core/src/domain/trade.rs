//! TradeRecord — one row of the per-trade log.

use super::outcome::Outcome;
use serde::{Deserialize, Serialize};

/// A single trade as reported to export collaborators.
///
/// Capital values are rounded to the run's `decimal_places`; the unrounded
/// values live in the capital trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// 1-based position in the run.
    pub index: usize,
    pub outcome: Outcome,
    pub capital_before: f64,
    pub capital_after: f64,
    pub profit_loss: f64,
}

impl TradeRecord {
    pub fn is_winner(&self) -> bool {
        self.outcome.is_win()
    }
}
