//! Host capability traits and implementations for screenbook.
//!
//! The strategy needs four things from a trading host: instrument
//! registration, point-in-time fundamentals, prices and holdings, and
//! target-weight orders. Each is a trait here so the rebalancer can be
//! driven by any platform. Implementations:
//!
//! - [`mock::MockHost`]: scripted data, records every order (tests)
//! - [`sim::SimHost`]: replays a [`history::MarketHistory`] file with a simple fill model
//!
//! [`calendar`] turns a month-start rule into concrete fire times.

pub mod calendar;
pub mod error;
pub mod history;
pub mod mock;
pub mod sim;
pub mod types;

pub use calendar::{MonthlyRule, MonthlySchedule};
pub use error::HostError;
pub use types::*;

use screenbook::{FundamentalsSnapshot, Instrument, Symbol};

/// Registers tickers with the host's data feed.
pub trait InstrumentRegistry {
    /// Register a ticker and return its instrument (symbol + market).
    fn register(&mut self, ticker: &str) -> Result<Instrument, HostError>;
}

/// Supplies point-in-time fundamentals.
pub trait FundamentalsProvider {
    /// Current snapshot for a symbol, or `None` if the provider has no data.
    fn fundamentals(&self, symbol: &Symbol) -> Option<FundamentalsSnapshot>;
}

/// Prices, holdings, and order entry.
pub trait OrderManager {
    /// Current price in cents.
    fn current_price(&self, symbol: &Symbol) -> Result<i64, HostError>;

    /// Current portfolio holdings.
    fn holdings(&self) -> Result<Vec<Holding>, HostError>;

    /// Move a position to `weight` (0.0..=1.0) of total portfolio value.
    fn set_target_weight(&mut self, symbol: Symbol, weight: f64) -> Result<(), HostError>;

    /// Close a position.
    fn liquidate(&mut self, symbol: Symbol) -> Result<(), HostError>;
}

/// Everything the rebalancer needs from a host.
pub trait Host: InstrumentRegistry + FundamentalsProvider + OrderManager {}

impl<T: InstrumentRegistry + FundamentalsProvider + OrderManager> Host for T {}

/// Reject weights outside 0.0..=1.0 (and NaN).
pub(crate) fn check_weight(symbol: Symbol, weight: f64) -> Result<(), HostError> {
    if (0.0..=1.0).contains(&weight) {
        Ok(())
    } else {
        Err(HostError::Order(format!(
            "target weight {weight} for {symbol} outside [0, 1]"
        )))
    }
}
