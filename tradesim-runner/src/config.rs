//! Serializable simulation configuration.
//!
//! A config file has three required sections:
//! - `trading_config`: capital, trade count, win rate, risk and reward
//! - `output_config`: where and what to export
//! - `simulation_config`: seed, progress display, rounding precision
//!
//! Files ending in `.toml` are parsed as TOML; anything else as JSON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tradesim_core::domain::{default_decimal_places, ParamError, SimulationParameters};

/// Sections every config file must contain.
pub const REQUIRED_SECTIONS: [&str; 3] = ["trading_config", "output_config", "simulation_config"];

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Errors from loading or validating a config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to encode TOML config: {0}")]
    TomlEncode(#[from] toml::ser::Error),
    #[error("config root must be a table of sections")]
    NotATable,
    #[error("missing required section: {0}")]
    MissingSection(&'static str),
    #[error("chart size must be two positive numbers, got [{0}, {1}]")]
    ChartSize(f64, f64),
    #[error(transparent)]
    Invalid(#[from] ParamError),
}

/// Full config file contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub trading_config: TradingConfig,
    pub output_config: OutputConfig,
    pub simulation_config: SimulationConfig,
}

/// Trading parameters of the simulated strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingConfig {
    pub initial_capital: f64,
    pub n_trades: usize,
    pub win_rate: f64,
    pub risk_per_trade: f64,
    pub reward_per_trade: f64,
}

/// Export settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_log_directory")]
    pub log_directory: PathBuf,
    #[serde(default = "default_true")]
    pub save_summary: bool,
    #[serde(default = "default_true")]
    pub save_trades: bool,
    #[serde(default = "default_true")]
    pub save_chart: bool,
    /// Chart width and height in inches (rendered at 100 px per inch).
    #[serde(default = "default_chart_size")]
    pub chart_size: [f64; 2],
}

/// Run settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<u64>,
    #[serde(default = "default_true")]
    pub enable_progress_bar: bool,
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
}

fn default_log_directory() -> PathBuf {
    PathBuf::from("trading_sim_logs")
}

fn default_true() -> bool {
    true
}

fn default_chart_size() -> [f64; 2] {
    [12.0, 6.0]
}

impl Default for TradingConfig {
    fn default() -> Self {
        let p = SimulationParameters::default();
        Self {
            initial_capital: p.initial_capital,
            n_trades: p.n_trades,
            win_rate: p.win_rate,
            risk_per_trade: p.risk_per_trade,
            reward_per_trade: p.reward_per_trade,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            log_directory: default_log_directory(),
            save_summary: true,
            save_trades: true,
            save_chart: true,
            chart_size: default_chart_size(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            random_seed: None,
            enable_progress_bar: true,
            decimal_places: default_decimal_places(),
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            trading_config: TradingConfig::default(),
            output_config: OutputConfig::default(),
            simulation_config: SimulationConfig::default(),
        }
    }
}

impl SimConfig {
    /// Load a config file, choosing the format from its extension.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if is_toml(path) {
            Self::from_toml(&content)
        } else {
            Self::from_json(&content)
        }
    }

    /// Parse a JSON config, reporting the first missing section by name.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        let root = value.as_object().ok_or(ConfigError::NotATable)?;
        check_sections(|name| root.contains_key(name))?;
        Ok(serde_json::from_value(value)?)
    }

    /// Parse a TOML config, reporting the first missing section by name.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = content.parse()?;
        check_sections(|name| table.contains_key(name))?;
        Ok(toml::Value::Table(table).try_into()?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the config in the format implied by `path`'s extension.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = if is_toml(path) {
            self.to_toml_string()?
        } else {
            self.to_json_pretty()?
        };
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Simulation parameters described by this config (not yet validated).
    pub fn to_parameters(&self) -> SimulationParameters {
        let t = &self.trading_config;
        SimulationParameters {
            initial_capital: t.initial_capital,
            n_trades: t.n_trades,
            win_rate: t.win_rate,
            risk_per_trade: t.risk_per_trade,
            reward_per_trade: t.reward_per_trade,
            random_seed: self.simulation_config.random_seed,
            decimal_places: self.simulation_config.decimal_places,
        }
    }

    /// Validate every section and return the run parameters.
    pub fn validated_parameters(&self) -> Result<SimulationParameters, ConfigError> {
        let params = self.to_parameters();
        params.validate()?;
        let [w, h] = self.output_config.chart_size;
        if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
            return Err(ConfigError::ChartSize(w, h));
        }
        Ok(params)
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"))
}

fn check_sections(has: impl Fn(&str) -> bool) -> Result<(), ConfigError> {
    for name in REQUIRED_SECTIONS {
        if !has(name) {
            return Err(ConfigError::MissingSection(name));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_JSON: &str = r#"{
        "trading_config": {
            "initial_capital": 10000,
            "n_trades": 100000,
            "win_rate": 0.4,
            "risk_per_trade": 0.01,
            "reward_per_trade": 0.02
        },
        "output_config": {
            "log_directory": "trading_sim_logs",
            "save_summary": true,
            "save_trades": true,
            "save_chart": true,
            "chart_size": [12, 6]
        },
        "simulation_config": {
            "random_seed": null,
            "enable_progress_bar": true,
            "decimal_places": 2
        }
    }"#;

    #[test]
    fn parses_reference_json() {
        let config = SimConfig::from_json(SAMPLE_JSON).unwrap();
        assert_eq!(config, SimConfig::default());
        assert!(config.validated_parameters().is_ok());
    }

    #[test]
    fn missing_section_is_named() {
        let json = r#"{"trading_config": {"initial_capital": 1, "n_trades": 1,
            "win_rate": 0.5, "risk_per_trade": 0.1, "reward_per_trade": 0.1},
            "simulation_config": {}}"#;
        let err = SimConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection("output_config")));
        assert_eq!(err.to_string(), "missing required section: output_config");
    }

    #[test]
    fn optional_fields_take_defaults() {
        let json = r#"{"trading_config": {"initial_capital": 500, "n_trades": 10,
            "win_rate": 0.5, "risk_per_trade": 0.1, "reward_per_trade": 0.2},
            "output_config": {}, "simulation_config": {"random_seed": 9}}"#;
        let config = SimConfig::from_json(json).unwrap();
        assert_eq!(config.output_config, OutputConfig::default());
        assert_eq!(config.simulation_config.random_seed, Some(9));
        assert_eq!(config.simulation_config.decimal_places, 2);
        assert!(config.simulation_config.enable_progress_bar);
    }

    #[test]
    fn default_precision_matches_core() {
        let core = SimulationParameters::default().decimal_places;
        assert_eq!(SimulationConfig::default().decimal_places, core);
        assert_eq!(SimConfig::default().to_parameters().decimal_places, core);
    }

    #[test]
    fn non_object_root_rejected() {
        assert!(matches!(
            SimConfig::from_json("[1, 2, 3]"),
            Err(ConfigError::NotATable)
        ));
    }

    #[test]
    fn invalid_trading_values_surface_field() {
        let mut config = SimConfig::default();
        config.trading_config.win_rate = 1.2;
        match config.validated_parameters() {
            Err(ConfigError::Invalid(e)) => assert_eq!(e.field(), "win_rate"),
            other => panic!("expected invalid win_rate, got {other:?}"),
        }
    }

    #[test]
    fn chart_size_must_be_positive() {
        let mut config = SimConfig::default();
        config.output_config.chart_size = [0.0, 6.0];
        assert!(matches!(
            config.validated_parameters(),
            Err(ConfigError::ChartSize(_, _))
        ));
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = SimConfig::default();
        config.simulation_config.random_seed = Some(1234);
        config.trading_config.n_trades = 250;
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("[trading_config]"));
        let back = SimConfig::from_toml(&toml_str).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn toml_missing_section() {
        let toml_str = r#"
[trading_config]
initial_capital = 100.0
n_trades = 5
win_rate = 0.5
risk_per_trade = 0.1
reward_per_trade = 0.1

[output_config]
"#;
        assert!(matches!(
            SimConfig::from_toml(toml_str),
            Err(ConfigError::MissingSection("simulation_config"))
        ));
    }

    #[test]
    fn to_parameters_carries_simulation_settings() {
        let mut config = SimConfig::default();
        config.simulation_config.random_seed = Some(5);
        config.simulation_config.decimal_places = 4;
        let p = config.to_parameters();
        assert_eq!(p.random_seed, Some(5));
        assert_eq!(p.decimal_places, 4);
        assert_eq!(p.n_trades, 100_000);
    }

    #[test]
    fn save_and_reload_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let config = SimConfig::default();
        for name in ["config.json", "config.toml"] {
            let path = dir.path().join(name);
            config.save(&path).unwrap();
            assert_eq!(SimConfig::from_file(&path).unwrap(), config);
        }
    }

    #[test]
    fn unreadable_file_reports_path() {
        let err = SimConfig::from_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
