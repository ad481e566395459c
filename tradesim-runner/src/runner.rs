//! Simulation runner — wires together config, core engine, and metrics.
//!
//! Three entry points:
//! - `run_from_config()`: validates a loaded config, then runs. Used by the CLI.
//! - `run_simulation()`: takes validated-or-not parameters and a progress observer.
//! - `run_with_rng()`: takes an explicit random stream. Used by sweeps and
//!   Monte Carlo repetition, where every run owns an independent stream.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use tradesim_core::domain::{SimulationParameters, TradeRecord};
use tradesim_core::progress::ProgressObserver;
use tradesim_core::simulation::{
    simulate_observed, simulate_with_rng, SimulationError, SimulationOutcome,
};
use tradesim_core::stats::SummaryStatistics;
use tradesim_core::NoProgress;

use crate::config::{ConfigError, SimConfig};
use crate::metrics::RunMetrics;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("simulation error: {0}")]
    Simulation(#[from] SimulationError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Label given to runs started from a config file.
pub const CONFIG_LABEL: &str = "config";

/// Complete result of a single simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// Content hash of the parameters; identical seeded runs share it.
    pub run_id: String,
    pub label: String,
    pub parameters: SimulationParameters,
    pub summary: SummaryStatistics,
    pub metrics: RunMetrics,
    pub trades: Vec<TradeRecord>,
    pub trajectory: Vec<f64>,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl SimulationResult {
    /// Assemble a result from a finished core run.
    pub fn from_outcome(
        label: &str,
        parameters: &SimulationParameters,
        outcome: SimulationOutcome,
    ) -> Self {
        let metrics = RunMetrics::compute(
            &outcome.trajectory,
            &outcome.outcomes,
            parameters.decimal_places,
        );
        Self {
            schema_version: SCHEMA_VERSION,
            run_id: run_id(parameters),
            label: label.to_string(),
            parameters: parameters.clone(),
            summary: outcome.summary,
            metrics,
            trades: outcome.trades,
            trajectory: outcome.trajectory,
        }
    }

    pub fn n_trades(&self) -> usize {
        self.trades.len()
    }
}

/// Run the simulation described by a config file.
pub fn run_from_config(
    config: &SimConfig,
    observer: &mut dyn ProgressObserver,
) -> Result<SimulationResult, RunError> {
    let params = config.validated_parameters()?;
    Ok(run_simulation(CONFIG_LABEL, &params, observer)?)
}

/// Run one simulation using the stream implied by `params.random_seed`.
pub fn run_simulation(
    label: &str,
    params: &SimulationParameters,
    observer: &mut dyn ProgressObserver,
) -> Result<SimulationResult, SimulationError> {
    info!(label, n_trades = params.n_trades, "starting simulation");
    let outcome = simulate_observed(params, observer)?;
    let result = SimulationResult::from_outcome(label, params, outcome);
    info!(
        label,
        final_capital = result.summary.final_capital,
        win_rate_percent = result.summary.win_rate_percent,
        "simulation completed"
    );
    Ok(result)
}

/// Run one simulation drawing from `rng`; `params.random_seed` is ignored.
pub fn run_with_rng<R: Rng + ?Sized>(
    label: &str,
    params: &SimulationParameters,
    rng: &mut R,
) -> Result<SimulationResult, SimulationError> {
    let outcome = simulate_with_rng(params, rng, &mut NoProgress)?;
    Ok(SimulationResult::from_outcome(label, params, outcome))
}

/// Deterministic content hash of the run parameters.
pub fn run_id(params: &SimulationParameters) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&params.initial_capital.to_le_bytes());
    hasher.update(&(params.n_trades as u64).to_le_bytes());
    hasher.update(&params.win_rate.to_le_bytes());
    hasher.update(&params.risk_per_trade.to_le_bytes());
    hasher.update(&params.reward_per_trade.to_le_bytes());
    match params.random_seed {
        Some(seed) => {
            hasher.update(&[1]);
            hasher.update(&seed.to_le_bytes());
        }
        None => {
            hasher.update(&[0]);
        }
    }
    hasher.update(&params.decimal_places.to_le_bytes());
    let hex = hasher.finalize().to_hex();
    hex.as_str()[..16].to_string()
}
