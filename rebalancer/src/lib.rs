//! screenbook-rebalancer: monthly ROE rotation driven through a host.
//!
//! Builds a screened universe once, then on each monthly trigger selects the
//! top holdings by ROE, applies exit rules, and sets target weights on the
//! host. Ships a TOML config layer, a JSONL audit trail, and a backtest
//! driver over the simulated host.

pub mod audit;
pub mod backtest;
pub mod config;
pub mod error;
pub mod strategy;

pub use error::{Error, Result};
pub use strategy::{CycleReport, Liquidation, Rebalancer, UniverseBuild, build_universe};
