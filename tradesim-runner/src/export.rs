//! Reporting and export — CSV, SVG, JSON and Markdown artifact generation.
//!
//! Every artifact of one run shares a `%Y%m%d_%H%M%S` timestamp suffix:
//! - `summary_{ts}.csv`: the six summary statistics, one row
//! - `trades_{ts}.csv`: the per-trade log
//! - `equity_curve_{ts}.svg`: capital over time
//! - `manifest_{ts}.json`: the full `SimulationResult`, schema-versioned
//! - `report_{ts}.md`: a human-readable summary
//!
//! The manifest and report are always written; the other three follow the
//! `save_*` flags of the output config.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::info;
use tradesim_core::domain::TradeRecord;
use tradesim_core::stats::{profit_factor_serde::INFINITY_LABEL, SummaryStatistics};

use crate::config::OutputConfig;
use crate::runner::{SimulationResult, SCHEMA_VERSION};

/// Pixels per inch of `chart_size` when rendering the equity curve.
pub const CHART_DPI: f64 = 100.0;

/// Upper bound on plotted points; longer trajectories are downsampled.
pub const MAX_CHART_POINTS: usize = 2_000;

pub const CHART_TITLE: &str = "Trading Simulation - Capital Growth";

/// A file written by `save_artifacts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedArtifact {
    pub label: &'static str,
    pub path: PathBuf,
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `SimulationResult` to pretty JSON.
pub fn export_json(result: &SimulationResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize SimulationResult to JSON")
}

/// Deserialize a `SimulationResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<SimulationResult> {
    let result: SimulationResult =
        serde_json::from_str(json).context("failed to deserialize SimulationResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

/// Load a manifest written by `save_artifacts`.
pub fn load_manifest(path: &Path) -> Result<SimulationResult> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Profit factor as text: `inf` for a run without losses.
pub fn format_profit_factor(value: f64, decimal_places: u32) -> String {
    if value.is_infinite() {
        INFINITY_LABEL.to_string()
    } else {
        fixed(value, decimal_places)
    }
}

fn fixed(value: f64, decimal_places: u32) -> String {
    format!("{:.*}", decimal_places as usize, value)
}

/// Export the summary statistics as a one-row CSV.
///
/// Columns: Winning_Trades, Losing_Trades, Win_Rate_Percent, Final_Capital,
/// Profit_Factor, Expectancy_Percent
pub fn export_summary_csv(summary: &SummaryStatistics, decimal_places: u32) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "Winning_Trades",
        "Losing_Trades",
        "Win_Rate_Percent",
        "Final_Capital",
        "Profit_Factor",
        "Expectancy_Percent",
    ])?;
    wtr.write_record([
        &summary.winning_trades.to_string(),
        &summary.losing_trades.to_string(),
        &fixed(summary.win_rate_percent, decimal_places),
        &fixed(summary.final_capital, decimal_places),
        &format_profit_factor(summary.profit_factor, decimal_places),
        &fixed(summary.expectancy_percent, decimal_places),
    ])?;
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export the per-trade log as CSV.
///
/// Columns: Trade, Result, Capital_Before, Capital_After, Profit_Loss
pub fn export_trades_csv(trades: &[TradeRecord], decimal_places: u32) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "Trade",
        "Result",
        "Capital_Before",
        "Capital_After",
        "Profit_Loss",
    ])?;
    for t in trades {
        wtr.write_record([
            &t.index.to_string(),
            &t.outcome.to_string(),
            &fixed(t.capital_before, decimal_places),
            &fixed(t.capital_after, decimal_places),
            &fixed(t.profit_loss, decimal_places),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Equity chart ───────────────────────────────────────────────────

/// Indices of at most `max_points` evenly spaced trajectory entries,
/// always keeping the first and last.
fn sample_indices(len: usize, max_points: usize) -> Vec<usize> {
    if len <= max_points || max_points < 2 {
        return (0..len).collect();
    }
    let step = (len - 1) as f64 / (max_points - 1) as f64;
    (0..max_points)
        .map(|k| ((k as f64 * step).round() as usize).min(len - 1))
        .collect()
}

/// Render the capital trajectory as a standalone SVG line chart.
///
/// `chart_size` is `[width, height]` in inches.
pub fn render_equity_svg(trajectory: &[f64], chart_size: [f64; 2]) -> String {
    let width = (chart_size[0] * CHART_DPI).round();
    let height = (chart_size[1] * CHART_DPI).round();
    let (left, right, top, bottom) = (90.0, 30.0, 50.0, 60.0);
    let plot_w = (width - left - right).max(1.0);
    let plot_h = (height - top - bottom).max(1.0);

    let indices = sample_indices(trajectory.len(), MAX_CHART_POINTS);
    let (lo, hi) = trajectory
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let span = if hi > lo { hi - lo } else { 1.0 };
    let last_x = trajectory.len().saturating_sub(1).max(1) as f64;

    let mut points = String::with_capacity(indices.len() * 16);
    for &i in &indices {
        let x = left + i as f64 / last_x * plot_w;
        let y = top + plot_h - (trajectory[i] - lo) / span * plot_h;
        let _ = write!(points, "{x:.1},{y:.1} ");
    }

    let mut svg = String::with_capacity(points.len() + 1024);
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">\n"
    ));
    svg.push_str(&format!(
        "<rect width=\"{width}\" height=\"{height}\" fill=\"white\"/>\n"
    ));
    svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"28\" text-anchor=\"middle\" font-family=\"sans-serif\" font-size=\"18\">{CHART_TITLE}</text>\n",
        width / 2.0
    ));

    // Axes and gridlines
    svg.push_str(&format!(
        "<g stroke=\"#999\" stroke-width=\"1\"><line x1=\"{left}\" y1=\"{top}\" x2=\"{left}\" y2=\"{:.1}\"/><line x1=\"{left}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\"/></g>\n",
        top + plot_h,
        top + plot_h,
        left + plot_w,
        top + plot_h
    ));
    for k in 0..=4 {
        let frac = k as f64 / 4.0;
        let y = top + plot_h - frac * plot_h;
        svg.push_str(&format!(
            "<line x1=\"{left}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"#ddd\" stroke-dasharray=\"4 4\"/>\n",
            left + plot_w
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" font-family=\"sans-serif\" font-size=\"11\">{:.0}</text>\n",
            left - 6.0,
            y + 4.0,
            lo + frac * span
        ));
    }
    svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-family=\"sans-serif\" font-size=\"13\">Trade Number</text>\n",
        left + plot_w / 2.0,
        height - 20.0
    ));
    svg.push_str(&format!(
        "<text x=\"20\" y=\"{:.1}\" text-anchor=\"middle\" font-family=\"sans-serif\" font-size=\"13\" transform=\"rotate(-90 20 {:.1})\">Capital (USD)</text>\n",
        top + plot_h / 2.0,
        top + plot_h / 2.0
    ));

    svg.push_str(&format!(
        "<polyline fill=\"none\" stroke=\"#1f77b4\" stroke-width=\"1.5\" points=\"{}\"/>\n",
        points.trim_end()
    ));

    // Legend
    svg.push_str(&format!(
        "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#1f77b4\" stroke-width=\"2\"/>\n",
        left + 12.0,
        top + 16.0,
        left + 36.0,
        top + 16.0
    ));
    svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" font-family=\"sans-serif\" font-size=\"12\">Capital over time</text>\n",
        left + 42.0,
        top + 20.0
    ));
    svg.push_str("</svg>\n");
    svg
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the artifact set for one run under `output.log_directory`,
/// stamped with the current local time.
pub fn save_artifacts(result: &SimulationResult, output: &OutputConfig) -> Result<Vec<SavedArtifact>> {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    save_artifacts_at(result, output, &timestamp)
}

/// Save the artifact set with an explicit timestamp suffix.
///
/// Returns the files written, in write order.
pub fn save_artifacts_at(
    result: &SimulationResult,
    output: &OutputConfig,
    timestamp: &str,
) -> Result<Vec<SavedArtifact>> {
    let dir = &output.log_directory;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory: {}", dir.display()))?;

    let dp = result.parameters.decimal_places;
    let mut saved = Vec::new();
    let mut write = |label: &'static str, name: String, content: String| -> Result<()> {
        let path = dir.join(name);
        std::fs::write(&path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(artifact = label, path = %path.display(), "artifact saved");
        saved.push(SavedArtifact { label, path });
        Ok(())
    };

    if output.save_summary {
        write(
            "summary",
            format!("summary_{timestamp}.csv"),
            export_summary_csv(&result.summary, dp)?,
        )?;
    }
    if output.save_trades {
        write(
            "trades",
            format!("trades_{timestamp}.csv"),
            export_trades_csv(&result.trades, dp)?,
        )?;
    }
    if output.save_chart {
        write(
            "chart",
            format!("equity_curve_{timestamp}.svg"),
            render_equity_svg(&result.trajectory, output.chart_size),
        )?;
    }
    write(
        "manifest",
        format!("manifest_{timestamp}.json"),
        export_json(result)?,
    )?;
    write("report", format!("report_{timestamp}.md"), generate_report(result))?;

    Ok(saved)
}

// ─── Markdown reports ───────────────────────────────────────────────

/// Generate a Markdown report for a single run.
pub fn generate_report(result: &SimulationResult) -> String {
    let p = &result.parameters;
    let s = &result.summary;
    let m = &result.metrics;
    let dp = p.decimal_places;
    let mut md = String::with_capacity(2048);

    md.push_str("# Trading Simulation Report\n\n");

    md.push_str("## Parameters\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Label | {} |\n", result.label));
    md.push_str(&format!("| Run ID | {} |\n", result.run_id));
    md.push_str(&format!("| Initial Capital | ${:.2} |\n", p.initial_capital));
    md.push_str(&format!("| Trades | {} |\n", p.n_trades));
    md.push_str(&format!("| Win Rate | {:.2}% |\n", p.win_rate * 100.0));
    md.push_str(&format!("| Risk per Trade | {:.2}% |\n", p.risk_per_trade * 100.0));
    md.push_str(&format!(
        "| Reward per Trade | {:.2}% |\n",
        p.reward_per_trade * 100.0
    ));
    match p.random_seed {
        Some(seed) => md.push_str(&format!("| Seed | {seed} |\n")),
        None => md.push_str("| Seed | entropy |\n"),
    }
    md.push('\n');

    md.push_str("## Summary\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Winning Trades | {} |\n", s.winning_trades));
    md.push_str(&format!("| Losing Trades | {} |\n", s.losing_trades));
    md.push_str(&format!(
        "| Realized Win Rate | {}% |\n",
        fixed(s.win_rate_percent, dp)
    ));
    md.push_str(&format!("| Final Capital | ${} |\n", fixed(s.final_capital, dp)));
    md.push_str(&format!(
        "| Profit Factor | {} |\n",
        format_profit_factor(s.profit_factor, dp)
    ));
    md.push_str(&format!(
        "| Expectancy | {}% |\n",
        fixed(s.expectancy_percent, dp)
    ));
    md.push('\n');

    md.push_str("## Path Metrics\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!(
        "| Total Return | {}% |\n",
        fixed(m.total_return_percent, dp)
    ));
    md.push_str(&format!(
        "| Max Drawdown | {}% |\n",
        fixed(m.max_drawdown_percent, dp)
    ));
    md.push_str(&format!("| Max Consecutive Wins | {} |\n", m.max_consecutive_wins));
    md.push_str(&format!(
        "| Max Consecutive Losses | {} |\n",
        m.max_consecutive_losses
    ));
    md.push_str(&format!("| Avg Losing Streak | {:.1} |\n", m.avg_losing_streak));
    md.push('\n');

    if s.is_perfect_streak() {
        md.push_str("> No losing trades: profit factor is unbounded.\n\n");
    }

    md
}

/// Generate a Markdown table comparing several runs side by side.
pub fn generate_comparison(results: &[SimulationResult]) -> String {
    let mut md = String::with_capacity(1024);
    md.push_str("# Scenario Comparison\n\n");
    md.push_str(
        "| Label | Win Rate | Risk | Reward | Realized Win % | Final Capital | Profit Factor | Expectancy % | Max DD % |\n",
    );
    md.push_str("| --- | --- | --- | --- | --- | --- | --- | --- | --- |\n");
    for r in results {
        let dp = r.parameters.decimal_places;
        md.push_str(&format!(
            "| {} | {:.2} | {:.3} | {:.3} | {} | {} | {} | {} | {} |\n",
            r.label,
            r.parameters.win_rate,
            r.parameters.risk_per_trade,
            r.parameters.reward_per_trade,
            fixed(r.summary.win_rate_percent, dp),
            fixed(r.summary.final_capital, dp),
            format_profit_factor(r.summary.profit_factor, dp),
            fixed(r.summary.expectancy_percent, dp),
            fixed(r.metrics.max_drawdown_percent, dp),
        ));
    }
    md
}
