//! Capital evolution engine.
//!
//! Applies each outcome multiplicatively to the *current* capital. Every step
//! depends on the previous capital value, so the loop is strictly sequential.
//! The running value and the trajectory keep full precision; only the
//! reported fields of each `TradeRecord` are rounded.
//!
//! Capital must stay a normal positive `f64`. A run that overflows to
//! infinity or decays into the subnormal range stops with
//! [`CapitalOutOfRange`] instead of emitting non-finite trade rows.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Outcome, TradeRecord};
use crate::progress::{milestone, NoProgress, ProgressObserver};

/// Trajectory and trade log produced by one pass of the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evolution {
    /// Unrounded capital after each trade; `trajectory[0]` is the initial capital.
    pub trajectory: Vec<f64>,
    pub trades: Vec<TradeRecord>,
}

/// Capital left the range of normal positive `f64` values.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error(
    "capital left the representable range at trade {trade} of {n_trades} \
     ({capital_before:e} -> {capital_after:e}); reduce n_trades or the risk/reward fractions"
)]
pub struct CapitalOutOfRange {
    /// 1-based index of the trade that produced the unrepresentable value.
    pub trade: usize,
    pub n_trades: usize,
    pub capital_before: f64,
    pub capital_after: f64,
}

impl Evolution {
    pub fn final_capital(&self) -> f64 {
        self.trajectory.last().copied().unwrap_or(0.0)
    }
}

/// Evolve capital through `outcomes`.
///
/// `risk` and `reward` are fractions of current capital. `decimal_places`
/// only affects the reported trade fields.
pub fn evolve(
    outcomes: &[Outcome],
    initial_capital: f64,
    risk: f64,
    reward: f64,
    decimal_places: u32,
) -> Result<Evolution, CapitalOutOfRange> {
    evolve_observed(
        outcomes,
        initial_capital,
        risk,
        reward,
        decimal_places,
        &mut NoProgress,
    )
}

/// Same as [`evolve`], notifying `observer` at every 10% milestone.
pub fn evolve_observed(
    outcomes: &[Outcome],
    initial_capital: f64,
    risk: f64,
    reward: f64,
    decimal_places: u32,
    observer: &mut dyn ProgressObserver,
) -> Result<Evolution, CapitalOutOfRange> {
    let total = outcomes.len();
    let mut trajectory = Vec::with_capacity(total + 1);
    let mut trades = Vec::with_capacity(total);

    let win_factor = 1.0 + reward;
    let loss_factor = 1.0 - risk;

    let mut current = initial_capital;
    trajectory.push(current);
    observer.on_start(total);

    for (i, &outcome) in outcomes.iter().enumerate() {
        let next = match outcome {
            Outcome::Win => current * win_factor,
            Outcome::Loss => current * loss_factor,
        };
        if !next.is_normal() || next < 0.0 {
            return Err(CapitalOutOfRange {
                trade: i + 1,
                n_trades: total,
                capital_before: current,
                capital_after: next,
            });
        }

        trades.push(TradeRecord {
            index: i + 1,
            outcome,
            capital_before: round_dp(current, decimal_places),
            capital_after: round_dp(next, decimal_places),
            profit_loss: round_dp(next - current, decimal_places),
        });
        trajectory.push(next);
        current = next;

        if let Some(percent) = milestone(i + 1, total) {
            observer.on_milestone(i + 1, total, percent);
        }
    }

    observer.on_finish(total);
    Ok(Evolution { trajectory, trades })
}

/// Round half away from zero to `decimal_places`.
///
/// Non-finite values pass through unchanged, as does any value whose
/// scaled form would overflow (precision beyond what `f64` can hold).
pub fn round_dp(value: f64, decimal_places: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scale = 10f64.powi(i32::try_from(decimal_places).unwrap_or(i32::MAX));
    let scaled = value * scale;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / scale
}
