//! JSONL audit trail logging.
//!
//! Each run appends events to an audit.jsonl file, one JSON object per line.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

use crate::backtest::BacktestReport;
use crate::error::Result;
use crate::strategy::{CycleReport, UniverseBuild};

/// An audit event written to the JSONL trail.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub event: &'static str,
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub data: serde_json::Value,
}

/// Append-only audit logger.
pub struct AuditLog {
    writer: BufWriter<std::fs::File>,
}

impl AuditLog {
    /// Open (or create) the audit log file for appending.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Log an event with arbitrary JSON data.
    pub fn log(&mut self, event: &'static str, data: serde_json::Value) -> Result<()> {
        let entry = AuditEvent {
            event,
            ts: Utc::now(),
            data,
        };
        let json = serde_json::to_string(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(self.writer, "{json}")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Log the screened universe.
pub fn log_universe_built(audit: &mut AuditLog, build: &UniverseBuild) -> Result<()> {
    let admitted: Vec<_> = build.admitted.iter().map(|i| i.symbol.as_str()).collect();
    let rejected: Vec<_> = build
        .rejected
        .iter()
        .map(|(symbol, why)| {
            serde_json::json!({
                "symbol": symbol.as_str(),
                "reason": why.to_string(),
            })
        })
        .collect();

    audit.log(
        "universe_built",
        serde_json::json!({
            "admitted": admitted,
            "rejected": rejected,
            "unavailable": build.unavailable,
        }),
    )
}

/// Log the start of a cycle.
pub fn log_cycle_started(
    audit: &mut AuditLog,
    at: Option<NaiveDateTime>,
    universe_size: usize,
) -> Result<()> {
    audit.log(
        "cycle_started",
        serde_json::json!({
            "at": at.map(|t| t.to_string()),
            "universe": universe_size,
        }),
    )
}

/// Log a finished cycle: selection, each liquidation, targets, and a summary.
pub fn log_cycle(audit: &mut AuditLog, report: &CycleReport) -> Result<()> {
    let members: Vec<_> = report
        .selection
        .members
        .iter()
        .map(|s| s.as_str())
        .collect();
    audit.log(
        "selection_computed",
        serde_json::json!({
            "members": members,
            "eligible": report.selection.eligible,
            "backfilled": report.selection.backfilled,
        }),
    )?;

    for l in &report.liquidations {
        audit.log(
            "position_liquidated",
            serde_json::json!({
                "symbol": l.symbol.as_str(),
                "reason": l.reason,
                "price": l.price_cents as f64 / 100.0,
                "buy_price": l.buy_price_cents.map(|c| c as f64 / 100.0),
                "change": l.change,
            }),
        )?;
    }

    let targets: Vec<_> = report
        .targets
        .iter()
        .map(|(symbol, weight)| {
            serde_json::json!({
                "symbol": symbol.as_str(),
                "weight": weight,
            })
        })
        .collect();
    audit.log("targets_set", serde_json::json!({ "targets": targets }))?;

    let skipped: Vec<_> = report.skipped.iter().map(|s| s.as_str()).collect();
    audit.log(
        "cycle_completed",
        serde_json::json!({
            "selected": report.selection.len(),
            "liquidated": report.liquidations.len(),
            "skipped": skipped,
            "total_weight": report.total_weight(),
        }),
    )
}

/// Log a backtest summary.
pub fn log_backtest_completed(audit: &mut AuditLog, report: &BacktestReport) -> Result<()> {
    audit.log(
        "backtest_completed",
        serde_json::json!({
            "cycles": report.cycles.len(),
            "initial_equity": report.initial_equity_cents as f64 / 100.0,
            "final_equity": report.final_equity_cents as f64 / 100.0,
            "costs": report.total_costs_cents as f64 / 100.0,
            "total_return": report.metrics.as_ref().map(|m| m.total_return),
            "sharpe": report.metrics.as_ref().map(|m| m.sharpe),
            "max_drawdown": report.metrics.as_ref().map(|m| m.max_drawdown),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use screenbook::{ExitReason, Selection, Symbol};

    use crate::strategy::Liquidation;

    #[test]
    fn audit_log_writes_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_audit.jsonl");

        {
            let mut log = AuditLog::open(&path).unwrap();
            log.log("test_event", serde_json::json!({})).unwrap();
            log.log("test_data", serde_json::json!({"key": "value"}))
                .unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        for line in &lines {
            let _: serde_json::Value = serde_json::from_str(line).unwrap();
        }

        assert!(lines[0].contains("\"event\":\"test_event\""));
        assert!(lines[1].contains("\"key\":\"value\""));
    }

    #[test]
    fn audit_log_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subdir").join("deep").join("audit.jsonl");

        let mut log = AuditLog::open(&path).unwrap();
        log.log("test", serde_json::json!({})).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn cycle_events_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");

        let report = CycleReport {
            selection: Selection {
                members: vec![Symbol::new("AAA")],
                eligible: 1,
                backfilled: 0,
            },
            liquidations: vec![Liquidation {
                symbol: Symbol::new("CCC"),
                reason: ExitReason::TakeProfit,
                price_cents: 13000,
                buy_price_cents: Some(10000),
                change: 0.30,
            }],
            targets: vec![(Symbol::new("IVV"), 0.10), (Symbol::new("AAA"), 0.90)],
            skipped: Vec::new(),
        };

        {
            let mut log = AuditLog::open(&path).unwrap();
            log_cycle_started(&mut log, None, 3).unwrap();
            log_cycle(&mut log, &report).unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let events: Vec<String> = contents
            .lines()
            .map(|l| {
                let v: serde_json::Value = serde_json::from_str(l).unwrap();
                v["event"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(
            events,
            [
                "cycle_started",
                "selection_computed",
                "position_liquidated",
                "targets_set",
                "cycle_completed"
            ]
        );
        assert!(contents.contains("\"reason\":\"take_profit\""));
        assert!(contents.contains("\"buy_price\":100.0"));
    }
}
