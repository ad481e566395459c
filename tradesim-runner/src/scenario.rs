//! Named parameter presets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tradesim_core::domain::SimulationParameters;

/// Built-in trading profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// High win rate, small reward.
    Conservative,
    Balanced,
    /// Low win rate, large reward.
    Aggressive,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [
        Scenario::Conservative,
        Scenario::Balanced,
        Scenario::Aggressive,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Scenario::Conservative => "conservative",
            Scenario::Balanced => "balanced",
            Scenario::Aggressive => "aggressive",
        }
    }

    /// Parameters for this preset: 10,000 capital over 100,000 trades.
    pub fn parameters(self) -> SimulationParameters {
        let (win_rate, risk_per_trade, reward_per_trade) = match self {
            Scenario::Conservative => (0.6, 0.01, 0.015),
            Scenario::Balanced => (0.5, 0.015, 0.025),
            Scenario::Aggressive => (0.3, 0.02, 0.04),
        };
        SimulationParameters {
            initial_capital: 10_000.0,
            n_trades: 100_000,
            win_rate,
            risk_per_trade,
            reward_per_trade,
            random_seed: None,
            decimal_places: 2,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .into_iter()
            .find(|sc| sc.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!("unknown scenario '{s}'. Valid: conservative, balanced, aggressive")
            })
    }
}
