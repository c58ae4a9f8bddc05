//! CLI entry point for the screenbook rebalancer.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use screenbook_host::MonthlySchedule;
use screenbook_host::history::MarketHistory;
use screenbook_host::sim::SimHost;
use screenbook_rebalancer::audit::{self, AuditLog};
use screenbook_rebalancer::backtest::{self, BacktestOptions};
use screenbook_rebalancer::config::Config;
use screenbook_rebalancer::error::Error;
use screenbook_rebalancer::{Rebalancer, build_universe};

#[derive(Parser)]
#[command(name = "screener")]
#[command(about = "Sector-screened ROE rotation: universe, single rebalance, backtest")]
#[command(version)]
struct Cli {
    /// Path to screener.toml (defaults apply if it does not exist)
    #[arg(long, default_value = "screener.toml")]
    config: PathBuf,

    /// Do not write the JSONL audit trail
    #[arg(long)]
    no_audit: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Screen the ticker list and print the universe
    Universe {
        /// Market history JSON file
        #[arg(long)]
        data: PathBuf,
    },

    /// Run a single rebalance cycle on one day
    Rebalance {
        /// Market history JSON file
        #[arg(long)]
        data: PathBuf,

        /// Trading day to rebalance on (default: last day in the file)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Replay the monthly schedule over the whole history
    Backtest {
        /// Market history JSON file
        #[arg(long)]
        data: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    let config = match Config::load_or_default(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Universe { data } => show_universe(&config, &data),
        Command::Rebalance { data, date } => rebalance_once(&config, &data, date, cli.no_audit),
        Command::Backtest { data } => run_backtest(&config, &data, cli.no_audit),
    };

    if let Err(e) = result {
        match e.downcast_ref::<Error>() {
            Some(Error::EmptyUniverse) => {
                eprintln!("Nothing to do: {e}");
                process::exit(2);
            }
            _ => {
                eprintln!("Error: {e:#}");
                process::exit(1);
            }
        }
    }
}

fn load_history(path: &Path) -> anyhow::Result<MarketHistory> {
    MarketHistory::load(path).with_context(|| format!("loading market data {}", path.display()))
}

fn open_audit(config: &Config, disabled: bool) -> anyhow::Result<Option<AuditLog>> {
    if disabled {
        return Ok(None);
    }
    let path = config.audit_path();
    let log = AuditLog::open(&path)
        .with_context(|| format!("opening audit log {}", path.display()))?;
    Ok(Some(log))
}

fn show_universe(config: &Config, data: &Path) -> anyhow::Result<()> {
    let params = config.strategy_params()?;
    let mut host = SimHost::new(load_history(data)?, config.backtest.sim_config());
    let build = build_universe(&params, &config.universe.tickers, &mut host)?;
    print!("{build}");
    Ok(())
}

fn rebalance_once(
    config: &Config,
    data: &Path,
    date: Option<NaiveDate>,
    no_audit: bool,
) -> anyhow::Result<()> {
    let params = config.strategy_params()?;
    let history = load_history(data)?;
    let date = match date.or_else(|| history.last_date()) {
        Some(d) => d,
        None => anyhow::bail!("{} has no trading days", data.display()),
    };

    let mut host = SimHost::new(history, config.backtest.sim_config());
    host.advance_to(date)?;

    let mut audit = open_audit(config, no_audit)?;
    let build = build_universe(&params, &config.universe.tickers, &mut host)?;
    if let Some(log) = audit.as_mut() {
        audit::log_universe_built(log, &build)?;
    }
    let mut rebalancer = Rebalancer::from_universe(params, build.symbols())?;

    let at = MonthlySchedule::new(rebalancer.schedule())
        .fire_times(&[date])
        .first()
        .copied();
    if let Some(log) = audit.as_mut() {
        audit::log_cycle_started(log, at, rebalancer.universe().len())?;
    }
    let report = rebalancer.rebalance(&mut host)?;
    if let Some(log) = audit.as_mut() {
        audit::log_cycle(log, &report)?;
    }

    println!("Rebalance on {date}");
    println!("{report}");
    Ok(())
}

fn run_backtest(config: &Config, data: &Path, no_audit: bool) -> anyhow::Result<()> {
    let params = config.strategy_params()?;
    let history = load_history(data)?;
    let options = BacktestOptions {
        periods_per_year: config.backtest.periods_per_year,
        risk_free: config.backtest.risk_free,
    };

    let mut audit = open_audit(config, no_audit)?;
    let report = backtest::run_backtest(
        history,
        params,
        &config.universe.tickers,
        config.backtest.sim_config(),
        &options,
        audit.as_mut(),
    )?;
    println!("{report}");
    Ok(())
}
