//! Interactive config creation for `tradesim init`.

use std::path::Path;

use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use tradesim_core::domain::MIN_FRACTION;
use tradesim_runner::SimConfig;

/// Ask before replacing an existing file. Returns `true` when writing may proceed.
pub fn confirm_overwrite(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("{} already exists. Overwrite it?", path.display()))
        .default(false)
        .interact()?)
}

/// Build a config from prompts, starting from the defaults.
pub fn create_config_interactive() -> Result<SimConfig> {
    let theme = ColorfulTheme::default();
    let mut config = SimConfig::default();

    println!("Trading parameters:");
    let t = &mut config.trading_config;
    t.initial_capital = Input::<f64>::with_theme(&theme)
        .with_prompt("Initial capital")
        .default(t.initial_capital)
        .validate_with(|v: &f64| positive(*v, "Initial capital must be positive"))
        .interact_text()?;
    t.n_trades = Input::<usize>::with_theme(&theme)
        .with_prompt("Number of trades")
        .default(t.n_trades)
        .validate_with(|v: &usize| {
            if *v > 0 {
                Ok(())
            } else {
                Err("Number of trades must be positive")
            }
        })
        .interact_text()?;
    t.win_rate = Input::<f64>::with_theme(&theme)
        .with_prompt("Win rate (0.0-1.0)")
        .default(t.win_rate)
        .validate_with(|v: &f64| {
            if (0.0..=1.0).contains(v) {
                Ok(())
            } else {
                Err("Win rate must be between 0 and 1")
            }
        })
        .interact_text()?;
    t.risk_per_trade = Input::<f64>::with_theme(&theme)
        .with_prompt("Risk per trade (0.01 = 1%)")
        .default(t.risk_per_trade)
        .validate_with(|v: &f64| {
            if *v >= MIN_FRACTION && *v < 1.0 {
                Ok(())
            } else {
                Err("Risk per trade must be at least 2.2e-16 and below 1")
            }
        })
        .interact_text()?;
    t.reward_per_trade = Input::<f64>::with_theme(&theme)
        .with_prompt("Reward per trade (0.02 = 2%)")
        .default(t.reward_per_trade)
        .validate_with(|v: &f64| {
            if v.is_finite() && *v >= MIN_FRACTION {
                Ok(())
            } else {
                Err("Reward per trade must be finite and at least 2.2e-16")
            }
        })
        .interact_text()?;

    println!("Output preferences:");
    let o = &mut config.output_config;
    o.save_summary = yes_no(&theme, "Save summary report?")?;
    o.save_trades = yes_no(&theme, "Save trade history?")?;
    o.save_chart = yes_no(&theme, "Save equity chart?")?;

    println!("Simulation preferences:");
    config.simulation_config.enable_progress_bar = yes_no(&theme, "Show progress bar?")?;

    Ok(config)
}

fn positive(v: f64, message: &'static str) -> Result<(), &'static str> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(message)
    }
}

fn yes_no(theme: &ColorfulTheme, prompt: &str) -> Result<bool> {
    Ok(Confirm::with_theme(theme)
        .with_prompt(prompt)
        .default(true)
        .interact()?)
}
