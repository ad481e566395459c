//! Summary statistics — a read-only snapshot computed once per run.
//!
//! `win_rate_percent` is the *realized* rate of this run's sample, while
//! `expectancy_percent` uses the *configured* win rate: one describes what
//! happened, the other the theoretical edge of the parameters.

use serde::{Deserialize, Serialize};

use crate::domain::{count_wins, Outcome, SimulationParameters};
use crate::engine::round_dp;

/// Aggregate statistics for a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate_percent: f64,
    pub final_capital: f64,
    /// `f64::INFINITY` when the run had no losing trades.
    #[serde(with = "profit_factor_serde")]
    pub profit_factor: f64,
    pub expectancy_percent: f64,
}

impl SummaryStatistics {
    /// True when the run contained no losing trade.
    pub fn is_perfect_streak(&self) -> bool {
        self.profit_factor.is_infinite()
    }
}

/// Derive the summary of a completed run.
///
/// `outcomes` must be non-empty and `trajectory` must be the matching
/// capital trajectory (`outcomes.len() + 1` values).
pub fn summarize(
    outcomes: &[Outcome],
    trajectory: &[f64],
    params: &SimulationParameters,
) -> SummaryStatistics {
    let dp = params.decimal_places;
    let n_trades = outcomes.len();
    let winning_trades = count_wins(outcomes);
    let losing_trades = n_trades - winning_trades;

    let win_rate_percent = if n_trades == 0 {
        0.0
    } else {
        round_dp(winning_trades as f64 / n_trades as f64 * 100.0, dp)
    };

    let final_capital = round_dp(
        trajectory.last().copied().unwrap_or(params.initial_capital),
        dp,
    );

    SummaryStatistics {
        winning_trades,
        losing_trades,
        win_rate_percent,
        final_capital,
        profit_factor: round_dp(
            profit_factor(
                winning_trades,
                losing_trades,
                params.reward_per_trade,
                params.risk_per_trade,
            ),
            dp,
        ),
        expectancy_percent: round_dp(params.expectancy() * 100.0, dp),
    }
}

/// Profit factor from trade counts and the fixed per-trade fractions.
///
/// Positive infinity when there are no losses, never NaN.
pub fn profit_factor(wins: usize, losses: usize, reward: f64, risk: f64) -> f64 {
    if losses == 0 {
        return f64::INFINITY;
    }
    (wins as f64 * reward) / (losses as f64 * risk)
}

/// Serializes an infinite profit factor as the string `"inf"`; JSON has no
/// representation for infinity.
pub mod profit_factor_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    pub const INFINITY_LABEL: &str = "inf";

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_infinite() && value.is_sign_positive() {
            serializer.serialize_str(INFINITY_LABEL)
        } else {
            serializer.serialize_f64(*value)
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Label(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(v) => Ok(v),
            Repr::Label(s) if s.eq_ignore_ascii_case(INFINITY_LABEL) => Ok(f64::INFINITY),
            Repr::Label(s) => Err(serde::de::Error::custom(format!(
                "invalid profit factor '{s}'"
            ))),
        }
    }
}
