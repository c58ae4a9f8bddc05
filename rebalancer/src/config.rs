//! TOML configuration loading and validation.
//!
//! Every section and key is optional; an empty file yields the standard
//! strategy (IVV 10%, MOAT 15%, top ten by ROE, -10% / +25% exits).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use screenbook::{
    Benchmark, DEFAULT_MAX_PORTFOLIO_SIZE, DEFAULT_TICKERS, ExitRule, RuleBook, SectorCode,
    SectorRule, StrategyParams, Symbol, UniverseFilter,
};
use screenbook_host::sim::SimConfig;

use crate::error::{Error, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub universe: UniverseConfig,
    #[serde(default)]
    pub exit: ExitConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub backtest: BacktestConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StrategyConfig {
    #[serde(default = "default_max_portfolio_size")]
    pub max_portfolio_size: usize,
    #[serde(default = "default_benchmarks")]
    pub benchmarks: Vec<BenchmarkConfig>,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            max_portfolio_size: default_max_portfolio_size(),
            benchmarks: default_benchmarks(),
        }
    }
}

fn default_max_portfolio_size() -> usize {
    DEFAULT_MAX_PORTFOLIO_SIZE
}
fn default_benchmarks() -> Vec<BenchmarkConfig> {
    vec![
        BenchmarkConfig {
            ticker: "IVV".into(),
            weight: 0.10,
        },
        BenchmarkConfig {
            ticker: "MOAT".into(),
            weight: 0.15,
        },
    ]
}

#[derive(Debug, Clone, Deserialize)]
pub struct BenchmarkConfig {
    pub ticker: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UniverseConfig {
    #[serde(default = "default_tickers")]
    pub tickers: Vec<String>,
    #[serde(default = "default_market")]
    pub market: String,
    #[serde(default = "default_min_market_cap")]
    pub min_market_cap: f64,
    /// Sector classification codes (101-104 by default).
    #[serde(default = "default_sectors")]
    pub sectors: Vec<u16>,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            tickers: default_tickers(),
            market: default_market(),
            min_market_cap: default_min_market_cap(),
            sectors: default_sectors(),
        }
    }
}

fn default_tickers() -> Vec<String> {
    DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect()
}
fn default_market() -> String {
    "usa".into()
}
fn default_min_market_cap() -> f64 {
    10e9
}
fn default_sectors() -> Vec<u16> {
    SectorCode::SCREENED.iter().map(|s| s.code()).collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExitConfig {
    #[serde(default = "default_stop_loss")]
    pub stop_loss: f64,
    #[serde(default = "default_take_profit")]
    pub take_profit: f64,
    #[serde(default = "default_true")]
    pub reenter_same_cycle: bool,
}

impl Default for ExitConfig {
    fn default() -> Self {
        Self {
            stop_loss: default_stop_loss(),
            take_profit: default_take_profit(),
            reenter_same_cycle: true,
        }
    }
}

fn default_stop_loss() -> f64 {
    -0.10
}
fn default_take_profit() -> f64 {
    0.25
}
fn default_true() -> bool {
    true
}

/// Per-sector threshold overrides. A given table replaces the whole rule.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RulesConfig {
    pub materials: Option<SectorRule>,
    pub communication: Option<SectorRule>,
    /// Applies to both Information Technology and Health Care.
    pub technology: Option<SectorRule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BacktestConfig {
    /// Starting cash in dollars.
    #[serde(default = "default_initial_cash")]
    pub initial_cash: f64,
    #[serde(default)]
    pub commission_bps: u32,
    #[serde(default)]
    pub slippage_bps: u32,
    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: f64,
    /// Per-period risk-free rate for the Sharpe ratio.
    #[serde(default)]
    pub risk_free: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_cash: default_initial_cash(),
            commission_bps: 0,
            slippage_bps: 0,
            periods_per_year: default_periods_per_year(),
            risk_free: 0.0,
        }
    }
}

fn default_initial_cash() -> f64 {
    100_000.0
}
fn default_periods_per_year() -> f64 {
    12.0
}

impl BacktestConfig {
    /// Cash and cost settings for the simulated host.
    pub fn sim_config(&self) -> SimConfig {
        SimConfig {
            initial_cash_cents: (self.initial_cash * 100.0).round() as i64,
            commission_bps: self.commission_bps,
            slippage_bps: self.slippage_bps,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default = "default_audit_file")]
    pub audit_file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            audit_file: default_audit_file(),
        }
    }
}

fn default_log_dir() -> String {
    "./logs".into()
}
fn default_audit_file() -> String {
    "audit.jsonl".into()
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&contents)
    }

    /// Load `path` if it exists, otherwise the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            log::info!("{} not found, using default configuration", path.display());
            Ok(Self::default())
        }
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config invariants.
    fn validate(&self) -> Result<()> {
        if self.universe.tickers.is_empty() {
            return Err(Error::Config("universe.tickers must not be empty".into()));
        }
        if let Some(bad) = self
            .universe
            .tickers
            .iter()
            .find(|t| Symbol::try_new(t).is_none())
        {
            return Err(Error::Config(format!("invalid ticker in universe: {bad:?}")));
        }
        if self.universe.sectors.is_empty() {
            return Err(Error::Config("universe.sectors must not be empty".into()));
        }
        if !(self.backtest.initial_cash > 0.0) {
            return Err(Error::Config("backtest.initial_cash must be > 0".into()));
        }
        if !(self.backtest.periods_per_year > 0.0) {
            return Err(Error::Config(
                "backtest.periods_per_year must be > 0".into(),
            ));
        }
        self.strategy_params()?.validate()?;
        Ok(())
    }

    /// Build the strategy parameter set.
    pub fn strategy_params(&self) -> Result<StrategyParams> {
        let benchmarks = self
            .strategy
            .benchmarks
            .iter()
            .map(|b| {
                let symbol = Symbol::try_new(&b.ticker)
                    .ok_or_else(|| Error::Config(format!("invalid benchmark ticker {:?}", b.ticker)))?;
                Ok(Benchmark {
                    symbol,
                    weight: b.weight,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut rules = RuleBook::default();
        if let Some(rule) = self.rules.materials {
            rules.set(SectorCode::Materials, rule);
        }
        if let Some(rule) = self.rules.communication {
            rules.set(SectorCode::CommunicationServices, rule);
        }
        if let Some(rule) = self.rules.technology {
            rules.set(SectorCode::InformationTechnology, rule);
            rules.set(SectorCode::HealthCare, rule);
        }

        Ok(StrategyParams {
            max_portfolio_size: self.strategy.max_portfolio_size,
            benchmarks,
            universe: UniverseFilter {
                market: self.universe.market.clone(),
                min_market_cap: self.universe.min_market_cap,
                sectors: self
                    .universe
                    .sectors
                    .iter()
                    .map(|&c| SectorCode::from(c))
                    .collect(),
            },
            rules,
            exit: ExitRule {
                stop_loss: self.exit.stop_loss,
                take_profit: self.exit.take_profit,
            },
            reenter_same_cycle: self.exit.reenter_same_cycle,
        })
    }

    /// Full path to the audit log file.
    pub fn audit_path(&self) -> PathBuf {
        Path::new(&self.logging.dir).join(&self.logging.audit_file)
    }
}
