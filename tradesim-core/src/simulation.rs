//! End-to-end run: validate → generate → evolve → summarize.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{Outcome, ParamError, SimulationParameters, TradeRecord};
use crate::engine::{evolve_observed, CapitalOutOfRange};
use crate::progress::{NoProgress, ProgressObserver};
use crate::rng;
use crate::stats::{summarize, SummaryStatistics};
use crate::trials::generate_with;

/// Everything a run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    pub outcomes: Vec<Outcome>,
    pub trajectory: Vec<f64>,
    pub trades: Vec<TradeRecord>,
    pub summary: SummaryStatistics,
}

/// Why a run produced no outcome.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Invalid(#[from] ParamError),
    #[error(transparent)]
    CapitalOutOfRange(#[from] CapitalOutOfRange),
}

impl SimulationError {
    /// The offending parameter, when the run was rejected before starting.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Invalid(e) => Some(e.field()),
            Self::CapitalOutOfRange(_) => None,
        }
    }
}

/// Run a simulation with the stream implied by `params.random_seed`.
pub fn simulate(params: &SimulationParameters) -> Result<SimulationOutcome, SimulationError> {
    simulate_observed(params, &mut NoProgress)
}

/// Run a simulation, reporting progress to `observer`.
pub fn simulate_observed(
    params: &SimulationParameters,
    observer: &mut dyn ProgressObserver,
) -> Result<SimulationOutcome, SimulationError> {
    params.validate()?;
    if let Some(seed) = params.random_seed {
        info!(seed, "using random seed");
    }
    let mut stream = rng::stream(params.random_seed);
    run_validated(params, &mut stream, observer)
}

/// Run a simulation drawing from a caller-owned stream.
///
/// `params.random_seed` is ignored; the stream decides reproducibility. Used
/// by batch runners that derive one independent stream per run.
pub fn simulate_with_rng<R: Rng + ?Sized>(
    params: &SimulationParameters,
    rng: &mut R,
    observer: &mut dyn ProgressObserver,
) -> Result<SimulationOutcome, SimulationError> {
    params.validate()?;
    run_validated(params, rng, observer)
}

fn run_validated<R: Rng + ?Sized>(
    params: &SimulationParameters,
    rng: &mut R,
    observer: &mut dyn ProgressObserver,
) -> Result<SimulationOutcome, SimulationError> {
    debug!(
        n_trades = params.n_trades,
        win_rate = params.win_rate,
        risk = params.risk_per_trade,
        reward = params.reward_per_trade,
        "starting simulation"
    );

    let outcomes = generate_with(rng, params.n_trades, params.win_rate);
    let evolution = evolve_observed(
        &outcomes,
        params.initial_capital,
        params.risk_per_trade,
        params.reward_per_trade,
        params.decimal_places,
        observer,
    )
    .map_err(|e| {
        warn!(trade = e.trade, n_trades = e.n_trades, "capital left the representable range");
        e
    })?;
    let summary = summarize(&outcomes, &evolution.trajectory, params);

    debug!(
        wins = summary.winning_trades,
        losses = summary.losing_trades,
        final_capital = summary.final_capital,
        "simulation finished"
    );

    Ok(SimulationOutcome {
        outcomes,
        trajectory: evolution.trajectory,
        trades: evolution.trades,
        summary,
    })
}
