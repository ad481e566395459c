//! TradeSim CLI — simulate, configure and compare trading strategies.
//!
//! Commands:
//! - `run` — simulate the strategy described by a config file and save artifacts
//! - `init` — create a config file interactively (or with defaults)
//! - `scenarios` — run the built-in presets side by side
//! - `monte-carlo` — repeat the configured run and report the distribution

mod interactive;
mod progress;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tradesim_core::{ProgressObserver, RngHierarchy};
use tradesim_runner::config::DEFAULT_CONFIG_FILE;
use tradesim_runner::export::{format_profit_factor, generate_comparison};
use tradesim_runner::{
    run_from_config, run_monte_carlo, run_sweep, save_artifacts, scenario_runs,
    MonteCarloSummary, SimConfig, SimulationResult,
};

use crate::progress::{BarProgress, LogProgress};

#[derive(Parser)]
#[command(
    name = "tradesim",
    about = "TradeSim CLI — Monte Carlo simulation of fixed-fraction trading strategies"
)]
struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one simulation from a JSON or TOML config file.
    Run {
        /// Path to the config file.
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Random seed (overrides the config file).
        #[arg(long)]
        seed: Option<u64>,

        /// Number of trades (overrides the config file).
        #[arg(long)]
        trades: Option<usize>,

        /// Directory for artifacts (overrides the config file).
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Disable the progress bar.
        #[arg(long, default_value_t = false)]
        no_progress: bool,
    },
    /// Create a config file.
    Init {
        /// Where to write the config; `.toml` selects TOML, anything else JSON.
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        output: PathBuf,

        /// Overwrite without asking.
        #[arg(long, default_value_t = false)]
        force: bool,

        /// Write the default config without prompting.
        #[arg(long, default_value_t = false)]
        defaults: bool,
    },
    /// Run the conservative, balanced and aggressive presets in parallel.
    Scenarios {
        /// Number of trades per preset. Defaults to 100000.
        #[arg(long)]
        trades: Option<usize>,

        /// Master seed. Random when omitted.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Repeat the configured simulation and summarize final capital.
    MonteCarlo {
        /// Path to the config file.
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Number of repetitions.
        #[arg(long, default_value_t = 100)]
        iterations: usize,

        /// Master seed. Falls back to the config seed, then to entropy.
        #[arg(long)]
        seed: Option<u64>,

        /// Number of trades per repetition (overrides the config file).
        #[arg(long)]
        trades: Option<usize>,

        /// Print the summary as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            config,
            seed,
            trades,
            output_dir,
            no_progress,
        } => run_cmd(&config, seed, trades, output_dir, no_progress),
        Commands::Init {
            output,
            force,
            defaults,
        } => init_cmd(&output, force, defaults),
        Commands::Scenarios { trades, seed } => scenarios_cmd(trades, seed),
        Commands::MonteCarlo {
            config,
            iterations,
            seed,
            trades,
            json,
        } => monte_carlo_cmd(&config, iterations, seed, trades, json),
    }
}

/// Logs go to stderr; `RUST_LOG` wins unless `--verbose` is given.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("tradesim=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tradesim=info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: &Path) -> Result<SimConfig> {
    if !path.exists() {
        bail!(
            "configuration file {} not found. Create one with `tradesim init`",
            path.display()
        );
    }
    let config = SimConfig::from_file(path)?;
    info!(path = %path.display(), "configuration loaded");
    Ok(config)
}

fn run_cmd(
    config_path: &Path,
    seed: Option<u64>,
    trades: Option<usize>,
    output_dir: Option<PathBuf>,
    no_progress: bool,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(seed) = seed {
        config.simulation_config.random_seed = Some(seed);
    }
    if let Some(n) = trades {
        config.trading_config.n_trades = n;
    }
    if let Some(dir) = output_dir {
        config.output_config.log_directory = dir;
    }
    if no_progress {
        config.simulation_config.enable_progress_bar = false;
    }

    let mut observer: Box<dyn ProgressObserver> = if config.simulation_config.enable_progress_bar {
        Box::new(BarProgress::new())
    } else {
        Box::new(LogProgress)
    };

    let result = run_from_config(&config, observer.as_mut()).context("simulation failed")?;
    print_summary(&result);

    let saved = save_artifacts(&result, &config.output_config)?;
    println!("Simulation completed successfully!");
    for artifact in &saved {
        println!("{:<9} saved to: {}", artifact.label, artifact.path.display());
    }
    Ok(())
}

fn init_cmd(output: &Path, force: bool, defaults: bool) -> Result<()> {
    if !force && !interactive::confirm_overwrite(output)? {
        println!("Operation cancelled");
        return Ok(());
    }

    let config = if defaults {
        SimConfig::default()
    } else {
        interactive::create_config_interactive()?
    };
    config.validated_parameters()?;
    config.save(output)?;

    println!("Configuration saved to {}", output.display());
    println!("You can now run: tradesim run --config {}", output.display());
    Ok(())
}

fn scenarios_cmd(trades: Option<usize>, seed: Option<u64>) -> Result<()> {
    let hierarchy = hierarchy_for(seed);
    let runs = scenario_runs(trades);
    let results = run_sweep(&runs, &hierarchy)?;
    println!();
    print!("{}", generate_comparison(&results));
    println!();
    println!("Master seed: {}", hierarchy.master_seed());
    Ok(())
}

fn monte_carlo_cmd(
    config_path: &Path,
    iterations: usize,
    seed: Option<u64>,
    trades: Option<usize>,
    json: bool,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(n) = trades {
        config.trading_config.n_trades = n;
    }
    let params = config.validated_parameters()?;
    let hierarchy = hierarchy_for(seed.or(params.random_seed));

    let summary = run_monte_carlo(&params, iterations, &hierarchy)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_monte_carlo(&summary, params.decimal_places);
    }
    Ok(())
}

fn hierarchy_for(seed: Option<u64>) -> RngHierarchy {
    let hierarchy = match seed {
        Some(s) => RngHierarchy::new(s),
        None => RngHierarchy::from_entropy(),
    };
    debug!(master_seed = hierarchy.master_seed(), "seed hierarchy ready");
    hierarchy
}

fn print_summary(result: &SimulationResult) {
    let s = &result.summary;
    let m = &result.metrics;
    let dp = result.parameters.decimal_places as usize;
    println!();
    println!("=== Simulation Summary ===");
    println!("Winning_Trades:     {}", s.winning_trades);
    println!("Losing_Trades:      {}", s.losing_trades);
    println!("Win_Rate_Percent:   {:.dp$}", s.win_rate_percent);
    println!("Final_Capital:      {:.dp$}", s.final_capital);
    println!(
        "Profit_Factor:      {}",
        format_profit_factor(s.profit_factor, result.parameters.decimal_places)
    );
    println!("Expectancy_Percent: {:.dp$}", s.expectancy_percent);
    println!();
    println!("--- Path ---");
    println!("Total Return:       {:.dp$}%", m.total_return_percent);
    println!("Max Drawdown:       {:.dp$}%", m.max_drawdown_percent);
    println!("Max Consec Win:     {}", m.max_consecutive_wins);
    println!("Max Consec Loss:    {}", m.max_consecutive_losses);
    println!("Avg Lose Streak:    {:.1}", m.avg_losing_streak);
    println!();
}

fn print_monte_carlo(summary: &MonteCarloSummary, decimal_places: u32) {
    let dp = decimal_places as usize;
    println!();
    println!("=== Monte Carlo ({} runs) ===", summary.iterations);
    println!("Master seed:        {}", summary.master_seed);
    println!("Initial capital:    {:.dp$}", summary.initial_capital);
    println!("Mean final:         {:.dp$}", summary.mean_final_capital);
    println!("Median final:       {:.dp$}", summary.median_final_capital);
    println!("5th percentile:     {:.dp$}", summary.p05_final_capital);
    println!("95th percentile:    {:.dp$}", summary.p95_final_capital);
    println!("Worst / best:       {:.dp$} / {:.dp$}", summary.worst_final_capital, summary.best_final_capital);
    println!("P(loss):            {:.1}%", summary.probability_of_loss * 100.0);
    println!("Mean win rate:      {:.2}%", summary.mean_win_rate_percent);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_flags_parse() {
        let cli = Cli::try_parse_from([
            "tradesim", "run", "--seed", "7", "--trades", "500", "--no-progress", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Run {
                config,
                seed,
                trades,
                no_progress,
                ..
            } => {
                assert_eq!(config, PathBuf::from(DEFAULT_CONFIG_FILE));
                assert_eq!(seed, Some(7));
                assert_eq!(trades, Some(500));
                assert!(no_progress);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn monte_carlo_defaults() {
        let cli = Cli::try_parse_from(["tradesim", "monte-carlo"]).unwrap();
        match cli.command {
            Commands::MonteCarlo {
                iterations, json, ..
            } => {
                assert_eq!(iterations, 100);
                assert!(!json);
            }
            _ => panic!("expected monte-carlo"),
        }
    }

    #[test]
    fn missing_config_is_reported() {
        let err = load_config(Path::new("/no/such/config.json")).unwrap_err();
        assert!(err.to_string().contains("tradesim init"));
    }
}
