//! Mock host for testing: scripted instruments, prices, and fundamentals.
//!
//! Records every order so tests can assert on exactly what the strategy
//! asked for. Holdings are tracked as target weights.
//!
//! ```
//! use screenbook::{FundamentalsSnapshot, SectorCode, Symbol};
//! use screenbook_host::mock::MockHost;
//! use screenbook_host::OrderManager;
//!
//! let host = MockHost::builder()
//!     .with_etf("IVV", 200_00)
//!     .with_stock("AAPL", 150_00, FundamentalsSnapshot::new(SectorCode::InformationTechnology))
//!     .with_holding("AAPL", 0.10)
//!     .build();
//! assert_eq!(host.current_price(&Symbol::new("AAPL")).unwrap(), 150_00);
//! ```

use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};

use screenbook::{FundamentalsSnapshot, Instrument, Symbol};

use crate::error::HostError;
use crate::types::{Holding, HostOrder};
use crate::{FundamentalsProvider, InstrumentRegistry, OrderManager, check_weight};

/// Builder for [`MockHost`].
#[derive(Debug, Default)]
pub struct MockHostBuilder {
    markets: FxHashMap<Symbol, String>,
    prices: FxHashMap<Symbol, i64>,
    fundamentals: FxHashMap<Symbol, FundamentalsSnapshot>,
    weights: BTreeMap<Symbol, f64>,
    reject_orders: bool,
    fail_holdings: bool,
}

impl MockHostBuilder {
    /// Make a ticker registrable on the given market.
    pub fn with_instrument(mut self, ticker: &str, market: &str) -> Self {
        self.markets.insert(Symbol::new(ticker), market.to_string());
        self
    }

    pub fn with_price(mut self, ticker: &str, cents: i64) -> Self {
        self.prices.insert(Symbol::new(ticker), cents);
        self
    }

    pub fn with_fundamentals(mut self, ticker: &str, snapshot: FundamentalsSnapshot) -> Self {
        self.fundamentals.insert(Symbol::new(ticker), snapshot);
        self
    }

    /// US instrument with a price and fundamentals.
    pub fn with_stock(self, ticker: &str, cents: i64, snapshot: FundamentalsSnapshot) -> Self {
        self.with_instrument(ticker, "usa")
            .with_price(ticker, cents)
            .with_fundamentals(ticker, snapshot)
    }

    /// US instrument with a price and no fundamentals.
    pub fn with_etf(self, ticker: &str, cents: i64) -> Self {
        self.with_instrument(ticker, "usa").with_price(ticker, cents)
    }

    /// Start with an existing position at `weight`. Held symbols count as
    /// registered.
    pub fn with_holding(mut self, ticker: &str, weight: f64) -> Self {
        self.weights.insert(Symbol::new(ticker), weight);
        self
    }

    /// Fail every order with [`HostError::Order`].
    pub fn reject_orders(mut self) -> Self {
        self.reject_orders = true;
        self
    }

    /// Fail every holdings query.
    pub fn fail_holdings(mut self) -> Self {
        self.fail_holdings = true;
        self
    }

    pub fn build(self) -> MockHost {
        let registered = self.weights.keys().copied().collect();
        MockHost {
            markets: self.markets,
            prices: self.prices,
            fundamentals: self.fundamentals,
            weights: self.weights,
            registered,
            reject_orders: self.reject_orders,
            fail_holdings: self.fail_holdings,
            orders: Vec::new(),
        }
    }
}

/// A host that answers from scripted data and records submitted orders.
#[derive(Debug)]
pub struct MockHost {
    markets: FxHashMap<Symbol, String>,
    prices: FxHashMap<Symbol, i64>,
    fundamentals: FxHashMap<Symbol, FundamentalsSnapshot>,
    weights: BTreeMap<Symbol, f64>,
    registered: FxHashSet<Symbol>,
    reject_orders: bool,
    fail_holdings: bool,
    orders: Vec<HostOrder>,
}

impl MockHost {
    pub fn builder() -> MockHostBuilder {
        MockHostBuilder::default()
    }

    /// Orders submitted so far, in order.
    pub fn orders(&self) -> &[HostOrder] {
        &self.orders
    }

    pub fn clear_orders(&mut self) {
        self.orders.clear();
    }

    /// Current weight of a position (0.0 if flat).
    pub fn weight(&self, symbol: &Symbol) -> f64 {
        self.weights.get(symbol).copied().unwrap_or(0.0)
    }

    pub fn is_registered(&self, symbol: &Symbol) -> bool {
        self.registered.contains(symbol)
    }

    pub fn set_price(&mut self, ticker: &str, cents: i64) {
        self.prices.insert(Symbol::new(ticker), cents);
    }

    pub fn set_fundamentals(&mut self, ticker: &str, snapshot: FundamentalsSnapshot) {
        self.fundamentals.insert(Symbol::new(ticker), snapshot);
    }

    pub fn remove_fundamentals(&mut self, ticker: &str) {
        self.fundamentals.remove(&Symbol::new(ticker));
    }

    fn check_order(&self, symbol: Symbol) -> Result<(), HostError> {
        if !self.registered.contains(&symbol) {
            return Err(HostError::NotRegistered(symbol.to_string()));
        }
        if self.reject_orders {
            return Err(HostError::Order(format!("mock: order for {symbol} rejected")));
        }
        Ok(())
    }
}

impl InstrumentRegistry for MockHost {
    fn register(&mut self, ticker: &str) -> Result<Instrument, HostError> {
        let symbol =
            Symbol::try_new(ticker).ok_or_else(|| HostError::InvalidSymbol(ticker.to_string()))?;
        let market = self
            .markets
            .get(&symbol)
            .ok_or_else(|| HostError::UnknownInstrument(ticker.to_string()))?;
        let instrument = Instrument::new(symbol, market.clone());
        self.registered.insert(symbol);
        Ok(instrument)
    }
}

impl FundamentalsProvider for MockHost {
    fn fundamentals(&self, symbol: &Symbol) -> Option<FundamentalsSnapshot> {
        self.fundamentals.get(symbol).copied()
    }
}

impl OrderManager for MockHost {
    fn current_price(&self, symbol: &Symbol) -> Result<i64, HostError> {
        self.prices
            .get(symbol)
            .copied()
            .ok_or_else(|| HostError::NoPrice(symbol.to_string()))
    }

    fn holdings(&self) -> Result<Vec<Holding>, HostError> {
        if self.fail_holdings {
            return Err(HostError::Order("mock: holdings unavailable".into()));
        }
        Ok(self
            .weights
            .iter()
            .map(|(&symbol, &w)| Holding {
                symbol,
                invested: w > 0.0,
            })
            .collect())
    }

    fn set_target_weight(&mut self, symbol: Symbol, weight: f64) -> Result<(), HostError> {
        self.check_order(symbol)?;
        check_weight(symbol, weight)?;
        self.orders.push(HostOrder::TargetWeight { symbol, weight });
        if weight > 0.0 {
            self.weights.insert(symbol, weight);
        } else {
            self.weights.remove(&symbol);
        }
        Ok(())
    }

    fn liquidate(&mut self, symbol: Symbol) -> Result<(), HostError> {
        self.check_order(symbol)?;
        self.orders.push(HostOrder::Liquidate { symbol });
        self.weights.remove(&symbol);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use screenbook::SectorCode;

    fn aapl() -> Symbol {
        Symbol::new("AAPL")
    }

    fn host() -> MockHost {
        MockHost::builder()
            .with_stock(
                "AAPL",
                150_00,
                FundamentalsSnapshot::new(SectorCode::InformationTechnology),
            )
            .with_instrument("GMAB", "dk")
            .with_etf("IVV", 400_00)
            .with_holding("AAPL", 0.1)
            .build()
    }

    #[test]
    fn builder_basic() {
        let mut host = host();
        assert_eq!(host.current_price(&aapl()).unwrap(), 150_00);
        assert!(host.fundamentals(&aapl()).is_some());
        assert!(host.fundamentals(&Symbol::new("IVV")).is_none());
        assert_eq!(host.register("GMAB").unwrap().market, "dk");
        let holdings = host.holdings().unwrap();
        assert_eq!(holdings.len(), 1);
        assert!(holdings[0].invested);
    }

    #[test]
    fn register_unknown_ticker() {
        let mut host = host();
        assert!(matches!(
            host.register("MSFT"),
            Err(HostError::UnknownInstrument(_))
        ));
        assert!(matches!(
            host.register("NOTASYMBOL"),
            Err(HostError::InvalidSymbol(_))
        ));
    }

    #[test]
    fn orders_require_registration() {
        let mut host = host();
        let ivv = Symbol::new("IVV");
        assert!(matches!(
            host.set_target_weight(ivv, 0.2),
            Err(HostError::NotRegistered(_))
        ));
        host.register("IVV").unwrap();
        host.set_target_weight(ivv, 0.2).unwrap();
        assert_eq!(host.weight(&ivv), 0.2);
    }

    #[test]
    fn held_symbols_are_registered() {
        let mut host = host();
        assert!(host.is_registered(&aapl()));
        host.set_target_weight(aapl(), 0.2).unwrap();
        assert_eq!(host.weight(&aapl()), 0.2);
    }

    #[test]
    fn submit_records_orders() {
        let mut host = host();
        host.register("AAPL").unwrap();
        host.register("IVV").unwrap();
        host.set_target_weight(Symbol::new("IVV"), 0.1).unwrap();
        host.liquidate(aapl()).unwrap();

        assert_eq!(
            host.orders(),
            &[
                HostOrder::TargetWeight {
                    symbol: Symbol::new("IVV"),
                    weight: 0.1
                },
                HostOrder::Liquidate { symbol: aapl() },
            ]
        );
        assert_eq!(host.weight(&aapl()), 0.0);
        host.clear_orders();
        assert!(host.orders().is_empty());
    }

    #[test]
    fn reject_mode() {
        let mut host = MockHost::builder()
            .with_etf("IVV", 400_00)
            .reject_orders()
            .build();
        host.register("IVV").unwrap();
        assert!(matches!(
            host.set_target_weight(Symbol::new("IVV"), 0.1),
            Err(HostError::Order(_))
        ));
        assert!(host.orders().is_empty());
    }

    #[test]
    fn invalid_weight_rejected() {
        let mut host = host();
        assert!(host.set_target_weight(aapl(), -0.1).is_err());
        assert!(host.set_target_weight(aapl(), 1.01).is_err());
    }

    #[test]
    fn mutators() {
        let mut host = host();
        host.set_price("AAPL", 160_00);
        assert_eq!(host.current_price(&aapl()).unwrap(), 160_00);
        host.remove_fundamentals("AAPL");
        assert!(host.fundamentals(&aapl()).is_none());
        assert!(matches!(
            host.current_price(&Symbol::new("GMAB")),
            Err(HostError::NoPrice(_))
        ));
    }

    #[test]
    fn failing_holdings() {
        let host = MockHost::builder().fail_holdings().build();
        assert!(host.holdings().is_err());
    }
}
