//! Batch execution: parameter sweeps and Monte Carlo repetition.
//!
//! Runs execute in parallel with Rayon. Each run draws from its own stream,
//! derived from the master seed, the run label and the run index, so results
//! are identical regardless of thread count or scheduling order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use tradesim_core::domain::SimulationParameters;
use tradesim_core::progress::NoProgress;
use tradesim_core::rng::RngHierarchy;
use tradesim_core::simulation::{simulate_with_rng, SimulationError};

use crate::runner::{run_with_rng, SimulationResult};
use crate::scenario::Scenario;

/// Label under which Monte Carlo iterations derive their streams.
const MONTE_CARLO_LABEL: &str = "monte_carlo";

/// Errors from batch execution.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("run '{label}' failed: {source}")]
    RunFailed {
        label: String,
        #[source]
        source: SimulationError,
    },
    #[error("monte carlo needs at least one iteration")]
    NoIterations,
}

/// One entry of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRun {
    pub label: String,
    pub parameters: SimulationParameters,
}

impl SweepRun {
    pub fn new(label: impl Into<String>, parameters: SimulationParameters) -> Self {
        Self {
            label: label.into(),
            parameters,
        }
    }
}

/// Sweep entries for every built-in scenario, with `n_trades` overridden
/// when given.
pub fn scenario_runs(n_trades: Option<usize>) -> Vec<SweepRun> {
    Scenario::ALL
        .into_iter()
        .map(|sc| {
            let mut params = sc.parameters();
            if let Some(n) = n_trades {
                params.n_trades = n;
            }
            SweepRun::new(sc.name(), params)
        })
        .collect()
}

/// Run every entry in parallel, returning results in input order.
///
/// All entries are validated before any run starts.
pub fn run_sweep(
    runs: &[SweepRun],
    hierarchy: &RngHierarchy,
) -> Result<Vec<SimulationResult>, SweepError> {
    for run in runs {
        run.parameters
            .validate()
            .map_err(|e| SweepError::RunFailed {
                label: run.label.clone(),
                source: e.into(),
            })?;
    }

    info!(
        runs = runs.len(),
        master_seed = hierarchy.master_seed(),
        "starting sweep"
    );

    runs.par_iter()
        .enumerate()
        .map(|(i, run)| {
            let mut rng = hierarchy.rng_for(&run.label, i as u64);
            debug!(label = %run.label, "sweep run started");
            run_with_rng(&run.label, &run.parameters, &mut rng).map_err(|source| {
                SweepError::RunFailed {
                    label: run.label.clone(),
                    source,
                }
            })
        })
        .collect()
}

/// Distribution of outcomes across repeated runs of one parameter set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloSummary {
    pub iterations: usize,
    pub master_seed: u64,
    pub initial_capital: f64,
    pub mean_final_capital: f64,
    pub median_final_capital: f64,
    /// 5th percentile of final capital (pessimistic outcome).
    pub p05_final_capital: f64,
    /// 95th percentile of final capital (optimistic outcome).
    pub p95_final_capital: f64,
    pub worst_final_capital: f64,
    pub best_final_capital: f64,
    /// Fraction of runs that finished below the initial capital.
    pub probability_of_loss: f64,
    pub mean_win_rate_percent: f64,
}

/// Repeat one parameter set `iterations` times and aggregate the final capital.
pub fn run_monte_carlo(
    params: &SimulationParameters,
    iterations: usize,
    hierarchy: &RngHierarchy,
) -> Result<MonteCarloSummary, SweepError> {
    if iterations == 0 {
        return Err(SweepError::NoIterations);
    }
    params.validate().map_err(|e| SweepError::RunFailed {
        label: MONTE_CARLO_LABEL.to_string(),
        source: e.into(),
    })?;

    info!(
        iterations,
        n_trades = params.n_trades,
        master_seed = hierarchy.master_seed(),
        "starting monte carlo"
    );

    let samples: Vec<(f64, f64)> = (0..iterations)
        .into_par_iter()
        .map(|i| {
            let mut rng = hierarchy.rng_for(MONTE_CARLO_LABEL, i as u64);
            simulate_with_rng(params, &mut rng, &mut NoProgress)
                .map(|out| {
                    let final_capital = out.trajectory.last().copied().unwrap_or(0.0);
                    (final_capital, out.summary.win_rate_percent)
                })
                .map_err(|source| SweepError::RunFailed {
                    label: format!("{MONTE_CARLO_LABEL}#{i}"),
                    source,
                })
        })
        .collect::<Result<_, _>>()?;

    Ok(aggregate(params, hierarchy.master_seed(), samples))
}

fn aggregate(
    params: &SimulationParameters,
    master_seed: u64,
    samples: Vec<(f64, f64)>,
) -> MonteCarloSummary {
    let count = samples.len() as f64;
    let mut finals: Vec<f64> = samples.iter().map(|s| s.0).collect();
    finals.sort_by(|a, b| a.total_cmp(b));

    // Divide before summing; large finals would otherwise overflow the total.
    let mean_final = finals.iter().map(|f| f / count).sum::<f64>();
    let mean_win_rate = samples.iter().map(|s| s.1).sum::<f64>() / count;
    let losers = finals
        .iter()
        .filter(|&&f| f < params.initial_capital)
        .count();

    MonteCarloSummary {
        iterations: finals.len(),
        master_seed,
        initial_capital: params.initial_capital,
        mean_final_capital: mean_final,
        median_final_capital: percentile(&finals, 0.5),
        p05_final_capital: percentile(&finals, 0.05),
        p95_final_capital: percentile(&finals, 0.95),
        worst_final_capital: finals[0],
        best_final_capital: finals[finals.len() - 1],
        probability_of_loss: losers as f64 / count,
        mean_win_rate_percent: mean_win_rate,
    }
}

/// Nearest-rank percentile of a sorted, non-empty slice.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let idx = ((sorted.len() as f64 * q).floor() as usize).min(sorted.len() - 1);
    sorted[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(win_rate: f64) -> SimulationParameters {
        SimulationParameters {
            n_trades: 300,
            win_rate,
            ..Default::default()
        }
    }

    #[test]
    fn sweep_preserves_order_and_labels() {
        let runs = scenario_runs(Some(500));
        let results = run_sweep(&runs, &RngHierarchy::new(42)).unwrap();
        let labels: Vec<&str> = results.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["conservative", "balanced", "aggressive"]);
        assert!(results.iter().all(|r| r.n_trades() == 500));
    }

    #[test]
    fn sweep_is_reproducible() {
        let runs = scenario_runs(Some(1_000));
        let h = RngHierarchy::new(7);
        let a = run_sweep(&runs, &h).unwrap();
        let b = run_sweep(&runs, &h).unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.trajectory, y.trajectory);
        }
    }

    #[test]
    fn sweep_runs_use_independent_streams() {
        // Same parameters under two labels must not replay the same draws.
        let p = small(0.5);
        let runs = vec![SweepRun::new("a", p.clone()), SweepRun::new("b", p)];
        let results = run_sweep(&runs, &RngHierarchy::new(1)).unwrap();
        assert_ne!(results[0].trajectory, results[1].trajectory);
    }

    #[test]
    fn sweep_validates_before_running() {
        let runs = vec![
            SweepRun::new("ok", small(0.5)),
            SweepRun::new("bad", small(2.0)),
        ];
        match run_sweep(&runs, &RngHierarchy::new(1)) {
            Err(SweepError::RunFailed { label, source }) => {
                assert_eq!(label, "bad");
                assert_eq!(source.field(), Some("win_rate"));
            }
            other => panic!("expected RunFailed, got {other:?}"),
        }
    }

    #[test]
    fn sweep_reports_capital_overflow() {
        let p = SimulationParameters {
            n_trades: 100_000,
            win_rate: 0.6,
            risk_per_trade: 0.01,
            reward_per_trade: 0.02,
            ..Default::default()
        };
        let runs = vec![SweepRun::new("ok", small(0.5)), SweepRun::new("hot", p)];
        match run_sweep(&runs, &RngHierarchy::new(1)) {
            Err(SweepError::RunFailed { label, source }) => {
                assert_eq!(label, "hot");
                assert!(matches!(source, SimulationError::CapitalOutOfRange(_)));
            }
            other => panic!("expected RunFailed, got {other:?}"),
        }
    }

    #[test]
    fn monte_carlo_mean_of_huge_finals_is_finite() {
        let params = small(0.5);
        let samples = vec![(f64::MAX * 0.75, 50.0), (f64::MAX * 0.75, 50.0)];
        let summary = aggregate(&params, 0, samples);
        assert!(summary.mean_final_capital.is_finite());
        assert_eq!(summary.mean_final_capital, f64::MAX * 0.75);
    }

    #[test]
    fn monte_carlo_zero_iterations() {
        assert!(matches!(
            run_monte_carlo(&small(0.5), 0, &RngHierarchy::new(1)),
            Err(SweepError::NoIterations)
        ));
    }

    #[test]
    fn monte_carlo_is_reproducible_and_ordered() {
        let h = RngHierarchy::new(99);
        let a = run_monte_carlo(&small(0.4), 64, &h).unwrap();
        let b = run_monte_carlo(&small(0.4), 64, &h).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.iterations, 64);
        assert!(a.worst_final_capital <= a.p05_final_capital);
        assert!(a.p05_final_capital <= a.median_final_capital);
        assert!(a.median_final_capital <= a.p95_final_capital);
        assert!(a.p95_final_capital <= a.best_final_capital);
        assert!((0.0..=1.0).contains(&a.probability_of_loss));
    }

    #[test]
    fn monte_carlo_certain_outcomes() {
        let h = RngHierarchy::new(5);
        let all_win = run_monte_carlo(&small(1.0), 8, &h).unwrap();
        assert_eq!(all_win.probability_of_loss, 0.0);
        assert_eq!(all_win.mean_win_rate_percent, 100.0);
        assert_eq!(all_win.worst_final_capital, all_win.best_final_capital);

        let all_loss = run_monte_carlo(&small(0.0), 8, &h).unwrap();
        assert_eq!(all_loss.probability_of_loss, 1.0);
    }

    #[test]
    fn percentile_nearest_rank() {
        let v: Vec<f64> = (0..100).map(|i| i as f64).collect();
        assert_eq!(percentile(&v, 0.05), 5.0);
        assert_eq!(percentile(&v, 0.5), 50.0);
        assert_eq!(percentile(&v, 0.95), 95.0);
        assert_eq!(percentile(&[3.0], 0.95), 3.0);
    }
}
