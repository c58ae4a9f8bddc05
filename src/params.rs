//! Strategy parameters: everything the rebalancer needs besides the host.

use rustc_hash::FxHashSet;

use crate::allocation::Benchmark;
use crate::error::ParamsError;
use crate::exit::ExitRule;
use crate::rule::RuleBook;
use crate::types::Symbol;
use crate::universe::UniverseFilter;

/// Default maximum number of screened holdings.
pub const DEFAULT_MAX_PORTFOLIO_SIZE: usize = 10;

/// Complete parameter set for the ROE rotation strategy.
#[derive(Clone, Debug)]
pub struct StrategyParams {
    /// Upper bound on the selected set.
    pub max_portfolio_size: usize,
    /// Fixed-allocation instruments.
    pub benchmarks: Vec<Benchmark>,
    pub universe: UniverseFilter,
    pub rules: RuleBook,
    pub exit: ExitRule,
    /// Re-buy a still-selected holding in the same cycle it hit a price exit.
    pub reenter_same_cycle: bool,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            max_portfolio_size: DEFAULT_MAX_PORTFOLIO_SIZE,
            benchmarks: vec![Benchmark::new("IVV", 0.10), Benchmark::new("MOAT", 0.15)],
            universe: UniverseFilter::default(),
            rules: RuleBook::default(),
            exit: ExitRule::default(),
            reenter_same_cycle: true,
        }
    }
}

impl StrategyParams {
    /// Check parameter invariants.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.max_portfolio_size == 0 {
            return Err(ParamsError::ZeroPortfolioSize);
        }

        let mut seen = FxHashSet::default();
        for b in &self.benchmarks {
            if !(b.weight > 0.0 && b.weight <= 1.0) {
                return Err(ParamsError::BenchmarkWeight {
                    symbol: b.symbol.to_string(),
                    weight: b.weight,
                });
            }
            if !seen.insert(b.symbol) {
                return Err(ParamsError::DuplicateBenchmark(b.symbol.to_string()));
            }
        }
        let total: f64 = self.benchmarks.iter().map(|b| b.weight).sum();
        if total > 1.0 + 1e-9 {
            return Err(ParamsError::BenchmarkOverweight(total));
        }

        if !(self.exit.stop_loss > -1.0 && self.exit.stop_loss < 0.0) {
            return Err(ParamsError::StopLoss(self.exit.stop_loss));
        }
        if !(self.exit.take_profit > 0.0) {
            return Err(ParamsError::TakeProfit(self.exit.take_profit));
        }
        if !(self.universe.min_market_cap >= 0.0) {
            return Err(ParamsError::MarketCap(self.universe.min_market_cap));
        }
        Ok(())
    }

    /// True if `symbol` is one of the fixed-allocation instruments.
    pub fn is_benchmark(&self, symbol: &Symbol) -> bool {
        self.benchmarks.iter().any(|b| b.symbol == *symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let params = StrategyParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.max_portfolio_size, 10);
        assert!(params.is_benchmark(&Symbol::new("IVV")));
        assert!(params.is_benchmark(&Symbol::new("MOAT")));
        assert!(!params.is_benchmark(&Symbol::new("AAPL")));
        assert!(params.reenter_same_cycle);
    }

    #[test]
    fn rejects_zero_size() {
        let params = StrategyParams {
            max_portfolio_size: 0,
            ..StrategyParams::default()
        };
        assert_eq!(params.validate(), Err(ParamsError::ZeroPortfolioSize));
    }

    #[test]
    fn rejects_overweight_benchmarks() {
        let params = StrategyParams {
            benchmarks: vec![Benchmark::new("IVV", 0.60), Benchmark::new("MOAT", 0.50)],
            ..StrategyParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ParamsError::BenchmarkOverweight(_))
        ));
    }

    #[test]
    fn rejects_duplicate_benchmark() {
        let params = StrategyParams {
            benchmarks: vec![Benchmark::new("IVV", 0.10), Benchmark::new("IVV", 0.10)],
            ..StrategyParams::default()
        };
        assert_eq!(
            params.validate(),
            Err(ParamsError::DuplicateBenchmark("IVV".into()))
        );
    }

    #[test]
    fn rejects_bad_exit_thresholds() {
        let mut params = StrategyParams::default();
        params.exit.stop_loss = 0.05;
        assert!(matches!(params.validate(), Err(ParamsError::StopLoss(_))));

        let mut params = StrategyParams::default();
        params.exit.take_profit = 0.0;
        assert!(matches!(params.validate(), Err(ParamsError::TakeProfit(_))));
    }

    #[test]
    fn benchmarks_may_be_empty() {
        let params = StrategyParams {
            benchmarks: Vec::new(),
            ..StrategyParams::default()
        };
        assert!(params.validate().is_ok());
    }
}
