//! Simulated host replaying a [`MarketHistory`].
//!
//! Orders fill instantly at the current day's price. A target weight trades
//! the whole-share difference between the current position and
//! `equity * weight / price`; costs are charged in basis points of notional
//! and deducted from cash. Prices carry forward over days where a symbol
//! has no quote; fundamentals do not.

use chrono::NaiveDate;
use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};

use screenbook::{FundamentalsSnapshot, Instrument, Symbol};

use crate::error::HostError;
use crate::history::MarketHistory;
use crate::types::{Holding, HostOrder};
use crate::{FundamentalsProvider, InstrumentRegistry, OrderManager, check_weight};

/// Cash and cost settings for a simulation.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Starting cash (cents).
    pub initial_cash_cents: i64,
    /// Commission in basis points of notional.
    pub commission_bps: u32,
    /// Slippage estimate in basis points of notional.
    pub slippage_bps: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            initial_cash_cents: 100_000_00,
            commission_bps: 0,
            slippage_bps: 0,
        }
    }
}

impl SimConfig {
    /// Cost in cents for a trade of the given absolute notional.
    pub fn cost(&self, notional_cents: i64) -> i64 {
        let bps = (self.commission_bps + self.slippage_bps) as i64;
        notional_cents * bps / 10_000
    }
}

/// A simulated fill, kept for reporting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimFill {
    pub date: NaiveDate,
    pub symbol: Symbol,
    /// Signed: positive = buy.
    pub quantity: i64,
    pub price_cents: i64,
    pub cost_cents: i64,
}

/// File-backed host positioned on one day of a history.
#[derive(Debug)]
pub struct SimHost {
    history: MarketHistory,
    config: SimConfig,
    cursor: usize,
    cash: i64,
    positions: FxHashMap<Symbol, i64>,
    registered: FxHashSet<Symbol>,
    orders: Vec<HostOrder>,
    fills: Vec<SimFill>,
}

impl SimHost {
    /// Create a host positioned on the first day of `history`.
    pub fn new(history: MarketHistory, config: SimConfig) -> Self {
        Self {
            history,
            cash: config.initial_cash_cents,
            config,
            cursor: 0,
            positions: FxHashMap::default(),
            registered: FxHashSet::default(),
            orders: Vec::new(),
            fills: Vec::new(),
        }
    }

    pub fn history(&self) -> &MarketHistory {
        &self.history
    }

    /// Move to a trading day in the history.
    pub fn advance_to(&mut self, date: NaiveDate) -> Result<(), HostError> {
        self.cursor = self
            .history
            .day_index(date)
            .ok_or_else(|| HostError::History(format!("{date} is not in the history")))?;
        Ok(())
    }

    /// Current simulation date.
    pub fn date(&self) -> NaiveDate {
        self.history.days[self.cursor].date
    }

    /// Cash balance (cents).
    pub fn cash(&self) -> i64 {
        self.cash
    }

    /// Share position for a symbol (0 if flat).
    pub fn position(&self, symbol: &Symbol) -> i64 {
        self.positions.get(symbol).copied().unwrap_or(0)
    }

    /// Cash plus positions marked at current prices (cents).
    pub fn equity(&self) -> i64 {
        let marked: i64 = self
            .positions
            .iter()
            .map(|(sym, &qty)| qty * self.price_on_or_before(sym).unwrap_or(0))
            .sum();
        self.cash + marked
    }

    /// Orders issued since the last call.
    pub fn take_orders(&mut self) -> Vec<HostOrder> {
        std::mem::take(&mut self.orders)
    }

    /// Every fill so far.
    pub fn fills(&self) -> &[SimFill] {
        &self.fills
    }

    /// Latest quote at or before the cursor.
    fn price_on_or_before(&self, symbol: &Symbol) -> Option<i64> {
        self.history.days[..=self.cursor]
            .iter()
            .rev()
            .find_map(|d| d.prices.get(symbol).copied())
    }

    fn ensure_registered(&self, symbol: Symbol) -> Result<(), HostError> {
        if self.registered.contains(&symbol) {
            Ok(())
        } else {
            Err(HostError::NotRegistered(symbol.to_string()))
        }
    }

    fn fill(&mut self, symbol: Symbol, qty: i64, price: i64) {
        if qty == 0 {
            return;
        }
        let cost = self.config.cost(qty.abs() * price);
        self.cash -= qty * price + cost;

        let pos = self.positions.entry(symbol).or_insert(0);
        *pos += qty;
        if *pos == 0 {
            self.positions.remove(&symbol);
        }

        debug!(
            "{} fill {symbol} {qty:+} @ {:.2} (cost {:.2})",
            self.date(),
            price as f64 / 100.0,
            cost as f64 / 100.0
        );
        self.fills.push(SimFill {
            date: self.date(),
            symbol,
            quantity: qty,
            price_cents: price,
            cost_cents: cost,
        });
    }
}

impl InstrumentRegistry for SimHost {
    fn register(&mut self, ticker: &str) -> Result<Instrument, HostError> {
        let symbol =
            Symbol::try_new(ticker).ok_or_else(|| HostError::InvalidSymbol(ticker.to_string()))?;
        let spec = self
            .history
            .instrument(ticker)
            .ok_or_else(|| HostError::UnknownInstrument(ticker.to_string()))?;
        let instrument = Instrument::new(symbol, spec.market.clone());
        self.registered.insert(symbol);
        Ok(instrument)
    }
}

impl FundamentalsProvider for SimHost {
    fn fundamentals(&self, symbol: &Symbol) -> Option<FundamentalsSnapshot> {
        self.history.days[self.cursor]
            .fundamentals
            .get(symbol)
            .copied()
    }
}

impl OrderManager for SimHost {
    fn current_price(&self, symbol: &Symbol) -> Result<i64, HostError> {
        self.price_on_or_before(symbol)
            .ok_or_else(|| HostError::NoPrice(symbol.to_string()))
    }

    fn holdings(&self) -> Result<Vec<Holding>, HostError> {
        let mut holdings: Vec<Holding> = self
            .positions
            .iter()
            .map(|(&symbol, &qty)| Holding {
                symbol,
                invested: qty != 0,
            })
            .collect();
        holdings.sort_by_key(|h| h.symbol);
        Ok(holdings)
    }

    fn set_target_weight(&mut self, symbol: Symbol, weight: f64) -> Result<(), HostError> {
        self.ensure_registered(symbol)?;
        check_weight(symbol, weight)?;
        let price = self.current_price(&symbol)?;
        self.orders.push(HostOrder::TargetWeight { symbol, weight });

        let equity = self.equity();
        if equity <= 0 {
            return Err(HostError::Order(format!(
                "cannot size {symbol}: equity {equity} <= 0"
            )));
        }
        let target_qty = (equity as f64 * weight / price as f64) as i64;
        let diff = target_qty - self.position(&symbol);
        self.fill(symbol, diff, price);
        Ok(())
    }

    fn liquidate(&mut self, symbol: Symbol) -> Result<(), HostError> {
        self.ensure_registered(symbol)?;
        self.orders.push(HostOrder::Liquidate { symbol });
        let qty = self.position(&symbol);
        if qty != 0 {
            let price = self.current_price(&symbol)?;
            self.fill(symbol, -qty, price);
        }
        Ok(())
    }
}
