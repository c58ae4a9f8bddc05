//! Monthly replay over a small file-backed history.

#![allow(clippy::inconsistent_digit_grouping)]

use chrono::NaiveDate;
use serde_json::json;

use screenbook::{StrategyParams, Symbol};
use screenbook_host::history::MarketHistory;
use screenbook_host::sim::SimConfig;
use screenbook_rebalancer::audit::AuditLog;
use screenbook_rebalancer::backtest::{BacktestOptions, run_backtest};
use screenbook_rebalancer::Error;

fn tech(roe: f64) -> serde_json::Value {
    json!({
        "roe": roe, "profit_margin": 0.25, "price_to_book": 4.0,
        "operating_margin": 0.30, "gross_margin": 0.60, "revenue_growth": 0.12,
        "asset_turnover": 0.7, "roa": 0.10, "free_cash_flow": 1e9,
        "cash_ratio": 1.0, "market_cap": 5e10, "sector": 103
    })
}

fn day(date: &str, aaa: i64, bbb: i64) -> serde_json::Value {
    json!({
        "date": date,
        "prices": { "IVV": 200_00, "MOAT": 80_00, "AAA": aaa, "BBB": bbb },
        "fundamentals": { "AAA": tech(0.30), "BBB": tech(0.20) }
    })
}

fn history(days: Vec<serde_json::Value>) -> MarketHistory {
    let doc = json!({
        "instruments": [
            { "ticker": "IVV" }, { "ticker": "MOAT" },
            { "ticker": "AAA" }, { "ticker": "BBB" }
        ],
        "days": days,
    });
    MarketHistory::from_json(&doc.to_string()).unwrap()
}

fn flat_history() -> MarketHistory {
    history(vec![
        day("2015-01-02", 100_00, 50_00),
        day("2015-01-05", 100_00, 50_00),
        day("2015-02-02", 100_00, 50_00),
        day("2015-02-03", 100_00, 50_00),
        day("2015-03-02", 100_00, 50_00),
        day("2015-03-31", 100_00, 50_00),
    ])
}

#[test]
fn one_cycle_per_month_at_ten() {
    let report = run_backtest(
        flat_history(),
        StrategyParams::default(),
        &["AAA", "BBB"],
        SimConfig::default(),
        &BacktestOptions::default(),
        None,
    )
    .unwrap();

    let times: Vec<String> = report.cycles.iter().map(|c| c.at.to_string()).collect();
    assert_eq!(
        times,
        [
            "2015-01-02 10:00:00",
            "2015-02-02 10:00:00",
            "2015-03-02 10:00:00"
        ]
    );
    assert_eq!(report.returns.len(), 3);
    assert_eq!(report.final_date, NaiveDate::from_ymd_opt(2015, 3, 31).unwrap());
}

#[test]
fn flat_prices_without_costs_conserve_equity() {
    let report = run_backtest(
        flat_history(),
        StrategyParams::default(),
        &["AAA", "BBB"],
        SimConfig::default(),
        &BacktestOptions::default(),
        None,
    )
    .unwrap();

    assert_eq!(report.final_equity_cents, 100_000_00);
    assert_eq!(report.total_costs_cents, 0);
    let metrics = report.metrics.as_ref().unwrap();
    assert_eq!(metrics.total_return, 0.0);
    assert_eq!(metrics.max_drawdown, 0.0);
    assert!(report.cycles.iter().all(|c| c.report.liquidations.is_empty()));
}

#[test]
fn costs_reduce_final_equity() {
    let sim = SimConfig {
        commission_bps: 10,
        slippage_bps: 5,
        ..SimConfig::default()
    };
    let report = run_backtest(
        flat_history(),
        StrategyParams::default(),
        &["AAA", "BBB"],
        sim,
        &BacktestOptions::default(),
        None,
    )
    .unwrap();

    assert!(report.total_costs_cents > 0);
    assert_eq!(
        report.final_equity_cents,
        100_000_00 - report.total_costs_cents
    );
}

#[test]
fn take_profit_fires_in_later_month() {
    let history = history(vec![
        day("2015-01-02", 100_00, 50_00),
        day("2015-02-02", 130_00, 50_00),
        day("2015-02-27", 130_00, 50_00),
    ]);
    let report = run_backtest(
        history,
        StrategyParams::default(),
        &["AAA", "BBB"],
        SimConfig::default(),
        &BacktestOptions::default(),
        None,
    )
    .unwrap();

    assert_eq!(report.cycles.len(), 2);
    let feb = &report.cycles[1].report;
    assert_eq!(feb.liquidations.len(), 1);
    assert_eq!(feb.liquidations[0].symbol, Symbol::new("AAA"));
    assert!(report.final_equity_cents > 100_000_00);
    assert!(report.metrics.as_ref().unwrap().total_return > 0.0);
}

#[test]
fn anchor_without_prices_is_a_data_error() {
    let doc = json!({
        "instruments": [
            { "ticker": "IVV" }, { "ticker": "MOAT" }, { "ticker": "AAA" }
        ],
        "days": [{
            "date": "2015-01-02",
            "prices": { "IVV": 200_00, "MOAT": 80_00 },
            "fundamentals": { "AAA": tech(0.30) }
        }],
    });
    let history = MarketHistory::from_json(&doc.to_string()).unwrap();
    let result = run_backtest(
        history,
        StrategyParams::default(),
        &["AAA"],
        SimConfig::default(),
        &BacktestOptions::default(),
        None,
    );
    assert!(matches!(result, Err(Error::Data(_))));
}

#[test]
fn empty_universe_aborts() {
    let result = run_backtest(
        flat_history(),
        StrategyParams::default(),
        &["NOPE"],
        SimConfig::default(),
        &BacktestOptions::default(),
        None,
    );
    assert!(matches!(result, Err(Error::EmptyUniverse)));
}

#[test]
fn audit_trail_records_every_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logs").join("audit.jsonl");
    {
        let mut audit = AuditLog::open(&path).unwrap();
        run_backtest(
            flat_history(),
            StrategyParams::default(),
            &["AAA", "BBB"],
            SimConfig::default(),
            &BacktestOptions::default(),
            Some(&mut audit),
        )
        .unwrap();
    }

    let contents = std::fs::read_to_string(&path).unwrap();
    let events: Vec<String> = contents
        .lines()
        .map(|l| {
            let v: serde_json::Value = serde_json::from_str(l).unwrap();
            v["event"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(events.first().map(String::as_str), Some("universe_built"));
    assert_eq!(events.last().map(String::as_str), Some("backtest_completed"));
    assert_eq!(events.iter().filter(|e| *e == "cycle_started").count(), 3);
    assert_eq!(events.iter().filter(|e| *e == "cycle_completed").count(), 3);
}
