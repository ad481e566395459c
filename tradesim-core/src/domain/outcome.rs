//! Outcome — the result of a single Bernoulli trial.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of one trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    pub fn is_win(self) -> bool {
        matches!(self, Outcome::Win)
    }

    pub fn is_loss(self) -> bool {
        matches!(self, Outcome::Loss)
    }
}

impl From<bool> for Outcome {
    fn from(win: bool) -> Self {
        if win {
            Outcome::Win
        } else {
            Outcome::Loss
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win => f.write_str("Win"),
            Outcome::Loss => f.write_str("Loss"),
        }
    }
}

/// Number of wins in an outcome sequence.
pub fn count_wins(outcomes: &[Outcome]) -> usize {
    outcomes.iter().filter(|o| o.is_win()).count()
}
