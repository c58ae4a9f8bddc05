//! # screenbook
//!
//! Decision logic for a monthly, sector-screened ROE rotation strategy.
//!
//! Each cycle the strategy screens a fixed universe against sector-specific
//! financial-ratio thresholds, ranks the survivors by return on equity, keeps
//! the top ten (backfilling by ROE when fewer pass), exits holdings that fell
//! out of the set or crossed a stop-loss/take-profit threshold, and splits the
//! weight left after two fixed benchmark sleeves equally across the set.
//!
//! This crate is pure: no I/O, no host calls. The host traits live in
//! `screenbook-host`, and the stateful rebalancer that drives them lives in
//! `screenbook-rebalancer`.
//!
//! ## Quick Start
//!
//! ```
//! use screenbook::{select, allocate, RuleBook, StrategyParams, Symbol};
//! use screenbook::{FundamentalsSnapshot, SectorCode};
//!
//! let strong = FundamentalsSnapshot {
//!     roe: 0.30,
//!     profit_margin: 0.25,
//!     price_to_book: 4.0,
//!     operating_margin: 0.30,
//!     gross_margin: 0.65,
//!     revenue_growth: 0.12,
//!     asset_turnover: 0.7,
//!     roa: 0.12,
//!     free_cash_flow: 1e10,
//!     cash_ratio: 1.1,
//!     market_cap: 2e12,
//!     sector: SectorCode::InformationTechnology,
//! };
//! let weak = FundamentalsSnapshot { profit_margin: 0.05, roe: 0.10, ..strong };
//!
//! let entries = vec![
//!     (Symbol::new("A"), Some(strong)),
//!     (Symbol::new("B"), Some(weak)),
//! ];
//! let params = StrategyParams::default();
//! let selection = select(&entries, &params.rules, params.max_portfolio_size);
//!
//! // A passes; B is backfilled as the next best ROE
//! assert_eq!(selection.members, vec![Symbol::new("A"), Symbol::new("B")]);
//!
//! let targets = allocate(&params.benchmarks, &selection.members);
//! assert_eq!(targets.len(), 4);
//! assert!((targets[3].1 - 0.375).abs() < 1e-12);
//! ```
//!
//! ## Sector Rules
//!
//! | Sector | ROE | Profit margin | P/B | Op. margin | Gross margin |
//! |--------|-----|---------------|-----|------------|--------------|
//! | IT / Health Care | ≥ 0.15 | ≥ 0.20 | ≤ 5 | ≥ 0.25 | ≥ 0.50 |
//! | Materials | ≥ 0.12 | ≥ 0.10 | ≤ 2 | ≥ 0.10 | 0.20–0.30 |
//! | Communication | ≥ 0.12 | ≥ 0.15 | ≤ 2 | ≥ 0.17 | 0.20–0.30 |
//!
//! plus revenue growth, asset turnover, ROA, positive free cash flow, and
//! cash ratio. See [`SectorRule`].

pub mod allocation;
pub mod error;
pub mod exit;
pub mod fundamentals;
pub mod metrics;
pub mod params;
pub mod rule;
pub mod selection;
pub mod types;
pub mod universe;

pub use allocation::{Benchmark, allocate, member_weight, remaining_weight};
pub use error::ParamsError;
pub use exit::{ExitReason, ExitRule, price_change};
pub use fundamentals::{FundamentalsSnapshot, SectorCode};
pub use metrics::{Metrics, compute_metrics};
pub use params::{DEFAULT_MAX_PORTFOLIO_SIZE, StrategyParams};
pub use rule::{Bound, Criterion, RuleBook, SectorRule, Verdict};
pub use selection::{Selection, select};
pub use types::{Instrument, SYMBOL_CAPACITY, Symbol};
pub use universe::{Admission, DEFAULT_TICKERS, UniverseFilter};
