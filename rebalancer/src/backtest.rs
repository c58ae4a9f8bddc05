//! Replay the monthly schedule over a market history with a simulated host.
//!
//! Equity is marked at every fire time before the rebalance and once more on
//! the last day of the history; consecutive marks give one return per cycle.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use log::info;

use screenbook::{Metrics, StrategyParams, compute_metrics};
use screenbook_host::MonthlySchedule;
use screenbook_host::history::MarketHistory;
use screenbook_host::sim::{SimConfig, SimHost};

use crate::audit::{self, AuditLog};
use crate::error::{Error, Result};
use crate::strategy::{CycleReport, Rebalancer, build_universe};

/// Annualization and risk-free settings for the metrics.
#[derive(Debug, Clone, Copy)]
pub struct BacktestOptions {
    pub periods_per_year: f64,
    /// Per-period risk-free rate.
    pub risk_free: f64,
}

impl Default for BacktestOptions {
    fn default() -> Self {
        Self {
            periods_per_year: 12.0,
            risk_free: 0.0,
        }
    }
}

/// One executed cycle.
#[derive(Debug, Clone)]
pub struct CycleSummary {
    pub at: NaiveDateTime,
    /// Equity marked before the rebalance (cents).
    pub equity_cents: i64,
    pub report: CycleReport,
}

/// Result of a full replay.
#[derive(Debug, Clone)]
pub struct BacktestReport {
    pub cycles: Vec<CycleSummary>,
    pub initial_equity_cents: i64,
    pub final_date: NaiveDate,
    pub final_equity_cents: i64,
    pub total_costs_cents: i64,
    /// One simple return per cycle.
    pub returns: Vec<f64>,
    pub metrics: Option<Metrics>,
}

impl fmt::Display for BacktestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<18} {:>14} {:>9} {:>11}", "Cycle", "Equity", "Selected", "Liquidated")?;
        for c in &self.cycles {
            writeln!(
                f,
                "{:<18} {:>14.2} {:>9} {:>11}",
                c.at.format("%Y-%m-%d %H:%M"),
                c.equity_cents as f64 / 100.0,
                c.report.selection.len(),
                c.report.liquidations.len()
            )?;
        }
        writeln!(
            f,
            "Final equity on {}: ${:.2} (start ${:.2}, costs ${:.2})",
            self.final_date,
            self.final_equity_cents as f64 / 100.0,
            self.initial_equity_cents as f64 / 100.0,
            self.total_costs_cents as f64 / 100.0
        )?;
        match &self.metrics {
            Some(m) => write!(f, "{m}"),
            None => write!(f, "No cycles executed"),
        }
    }
}

/// Run the strategy over every month of `history`.
///
/// The universe is screened on the first day of the history; the schedule
/// follows the first admitted symbol's trading days.
pub fn run_backtest<S: AsRef<str>>(
    history: MarketHistory,
    params: StrategyParams,
    tickers: &[S],
    sim: SimConfig,
    options: &BacktestOptions,
    mut audit: Option<&mut AuditLog>,
) -> Result<BacktestReport> {
    params.validate()?;
    let initial_equity_cents = sim.initial_cash_cents;
    let mut host = SimHost::new(history, sim);

    let build = build_universe(&params, tickers, &mut host)?;
    if let Some(log) = audit.as_deref_mut() {
        audit::log_universe_built(log, &build)?;
    }
    let mut rebalancer = Rebalancer::from_universe(params, build.symbols())?;

    let schedule = MonthlySchedule::new(rebalancer.schedule());
    let anchor = schedule.rule().anchor;
    let fire_times = schedule.fire_times(&host.history().trading_days(&anchor));
    if fire_times.is_empty() {
        return Err(Error::Data(format!("{anchor} has no trading days")));
    }
    let final_date = host
        .history()
        .last_date()
        .ok_or_else(|| Error::Data("history has no trading days".into()))?;

    let mut cycles = Vec::with_capacity(fire_times.len());
    for at in fire_times {
        host.advance_to(at.date())?;
        let equity_cents = host.equity();
        if let Some(log) = audit.as_deref_mut() {
            audit::log_cycle_started(log, Some(at), rebalancer.universe().len())?;
        }

        let report = rebalancer.rebalance(&mut host)?;
        if let Some(log) = audit.as_deref_mut() {
            audit::log_cycle(log, &report)?;
        }
        info!(
            "{at}: equity ${:.2}, {} selected",
            equity_cents as f64 / 100.0,
            report.selection.len()
        );
        cycles.push(CycleSummary {
            at,
            equity_cents,
            report,
        });
    }

    host.advance_to(final_date)?;
    let final_equity_cents = host.equity();

    let marks: Vec<i64> = cycles
        .iter()
        .map(|c| c.equity_cents)
        .chain(std::iter::once(final_equity_cents))
        .collect();
    let returns: Vec<f64> = marks
        .windows(2)
        .map(|w| {
            if w[0] > 0 {
                (w[1] - w[0]) as f64 / w[0] as f64
            } else {
                0.0
            }
        })
        .collect();
    let metrics = compute_metrics(&returns, options.periods_per_year, options.risk_free);
    let total_costs_cents = host.fills().iter().map(|f| f.cost_cents).sum();

    let report = BacktestReport {
        cycles,
        initial_equity_cents,
        final_date,
        final_equity_cents,
        total_costs_cents,
        returns,
        metrics,
    };
    if let Some(log) = audit.as_deref_mut() {
        audit::log_backtest_completed(log, &report)?;
    }
    Ok(report)
}
