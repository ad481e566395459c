//! TradeSim Runner — config loading, run orchestration, batches, export.
//!
//! This crate builds on `tradesim-core` to provide:
//! - JSON/TOML config files with required sections and validation
//! - Single-run orchestration with path metrics (drawdown, streaks)
//! - Built-in scenario presets
//! - Parallel sweeps and Monte Carlo repetition with independent streams
//! - CSV, SVG, JSON and Markdown artifacts

pub mod config;
pub mod export;
pub mod metrics;
pub mod runner;
pub mod scenario;
pub mod sweep;

pub use config::{ConfigError, OutputConfig, SimConfig, SimulationConfig, TradingConfig};
pub use export::{save_artifacts, SavedArtifact};
pub use metrics::RunMetrics;
pub use runner::{run_from_config, run_simulation, run_with_rng, RunError, SimulationResult};
pub use scenario::Scenario;
pub use sweep::{run_monte_carlo, run_sweep, scenario_runs, MonteCarloSummary, SweepError, SweepRun};
