//! SimulationParameters — the immutable input of a single run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest supported rounding precision for reported values.
pub const MAX_DECIMAL_PLACES: u32 = 10;

/// Smallest risk or reward fraction that still moves capital: below it
/// `1.0 + fraction` rounds back to `1.0`.
pub const MIN_FRACTION: f64 = f64::EPSILON;

/// Parameter validation errors.
///
/// Every variant names the offending field and the constraint it broke so the
/// caller can correct its configuration without guessing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("invalid parameter `{field}` = {value}: {constraint}")]
    InvalidParameter {
        field: &'static str,
        value: String,
        constraint: &'static str,
    },
}

impl ParamError {
    fn invalid(field: &'static str, value: impl ToString, constraint: &'static str) -> Self {
        Self::InvalidParameter {
            field,
            value: value.to_string(),
            constraint,
        }
    }

    /// Name of the field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidParameter { field, .. } => field,
        }
    }
}

/// Inputs of one simulation run.
///
/// `risk_per_trade` is the fraction of *current* capital lost on a losing
/// trade; `reward_per_trade` the fraction gained on a winning one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub initial_capital: f64,
    pub n_trades: usize,
    pub win_rate: f64,
    pub risk_per_trade: f64,
    pub reward_per_trade: f64,
    #[serde(default)]
    pub random_seed: Option<u64>,
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
}

/// Rounding precision used when a config omits `decimal_places`.
pub fn default_decimal_places() -> u32 {
    2
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            initial_capital: 10_000.0,
            n_trades: 100_000,
            win_rate: 0.4,
            risk_per_trade: 0.01,
            reward_per_trade: 0.02,
            random_seed: None,
            decimal_places: default_decimal_places(),
        }
    }
}

impl SimulationParameters {
    /// Check every field against its domain.
    ///
    /// Fields are checked in declaration order and the first violation is
    /// returned.
    pub fn validate(&self) -> Result<(), ParamError> {
        if !self.initial_capital.is_normal() || self.initial_capital < 0.0 {
            return Err(ParamError::invalid(
                "initial_capital",
                self.initial_capital,
                "initial capital must be positive",
            ));
        }
        if self.n_trades == 0 {
            return Err(ParamError::invalid(
                "n_trades",
                self.n_trades,
                "number of trades must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&self.win_rate) {
            return Err(ParamError::invalid(
                "win_rate",
                self.win_rate,
                "win rate must be between 0 and 1",
            ));
        }
        if !self.risk_per_trade.is_finite() || self.risk_per_trade <= 0.0 {
            return Err(ParamError::invalid(
                "risk_per_trade",
                self.risk_per_trade,
                "risk per trade must be positive",
            ));
        }
        if self.risk_per_trade < MIN_FRACTION {
            return Err(ParamError::invalid(
                "risk_per_trade",
                self.risk_per_trade,
                "risk per trade is too small to change capital (minimum 2.2e-16)",
            ));
        }
        if self.risk_per_trade >= 1.0 {
            return Err(ParamError::invalid(
                "risk_per_trade",
                self.risk_per_trade,
                "risk per trade must be below 1 (a full loss wipes the account)",
            ));
        }
        if !self.reward_per_trade.is_finite() || self.reward_per_trade <= 0.0 {
            return Err(ParamError::invalid(
                "reward_per_trade",
                self.reward_per_trade,
                "reward per trade must be positive",
            ));
        }
        if self.reward_per_trade < MIN_FRACTION {
            return Err(ParamError::invalid(
                "reward_per_trade",
                self.reward_per_trade,
                "reward per trade is too small to change capital (minimum 2.2e-16)",
            ));
        }
        if self.decimal_places > MAX_DECIMAL_PLACES {
            return Err(ParamError::invalid(
                "decimal_places",
                self.decimal_places,
                "decimal places must be at most 10",
            ));
        }
        Ok(())
    }

    /// Theoretical edge per trade as a fraction of capital, from the
    /// configured win rate.
    pub fn expectancy(&self) -> f64 {
        self.win_rate * self.reward_per_trade - (1.0 - self.win_rate) * self.risk_per_trade
    }
}
