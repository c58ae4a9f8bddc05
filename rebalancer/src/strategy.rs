//! The rebalancer: builds the universe once, then runs one cycle per call.
//!
//! A cycle reads fundamentals for every universe symbol, selects the top
//! holdings by ROE, liquidates holdings that dropped out or crossed an exit
//! threshold, and sets target weights for the benchmarks and the selection.
//! Host failures are not caught; they abort the cycle with [`Error::Host`].

use std::fmt;

use log::{debug, info, warn};
use rustc_hash::{FxHashMap, FxHashSet};

use screenbook::{
    Admission, ExitReason, Instrument, Selection, StrategyParams, Symbol, allocate, price_change,
    select,
};
use screenbook_host::{Host, HostError, MonthlyRule};

use crate::error::{Error, Result};

/// Outcome of screening the candidate tickers.
#[derive(Debug, Clone, Default)]
pub struct UniverseBuild {
    /// Admitted instruments, in ticker order.
    pub admitted: Vec<Instrument>,
    /// Registered but screened out.
    pub rejected: Vec<(Symbol, Admission)>,
    /// Tickers the host does not carry.
    pub unavailable: Vec<String>,
}

impl UniverseBuild {
    pub fn symbols(&self) -> Vec<Symbol> {
        self.admitted.iter().map(|i| i.symbol).collect()
    }
}

impl fmt::Display for UniverseBuild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Universe: {} admitted", self.admitted.len())?;
        for inst in &self.admitted {
            writeln!(f, "  {:<8} {}", inst.symbol, inst.market)?;
        }
        if !self.rejected.is_empty() {
            writeln!(f, "Screened out: {}", self.rejected.len())?;
            for (symbol, why) in &self.rejected {
                writeln!(f, "  {symbol:<8} {why}")?;
            }
        }
        if !self.unavailable.is_empty() {
            writeln!(f, "Not on host: {}", self.unavailable.join(", "))?;
        }
        Ok(())
    }
}

/// Register benchmarks and candidate tickers, then screen the candidates.
///
/// Duplicate tickers are registered once and benchmarks never enter the
/// universe. A ticker the host reports as unknown is skipped; any other
/// host failure is returned.
pub fn build_universe<H, S>(
    params: &StrategyParams,
    tickers: &[S],
    host: &mut H,
) -> Result<UniverseBuild>
where
    H: Host,
    S: AsRef<str>,
{
    for benchmark in &params.benchmarks {
        host.register(benchmark.symbol.as_str())?;
    }

    let mut build = UniverseBuild::default();
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    for ticker in tickers {
        let ticker = ticker.as_ref();
        if !seen.insert(ticker) {
            continue;
        }
        let instrument = match host.register(ticker) {
            Ok(instrument) => instrument,
            Err(HostError::UnknownInstrument(_)) => {
                warn!("{ticker}: not available on host, skipped");
                build.unavailable.push(ticker.to_string());
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        if params.is_benchmark(&instrument.symbol) {
            continue;
        }

        let snapshot = host.fundamentals(&instrument.symbol);
        match params.universe.admit(&instrument, snapshot.as_ref()) {
            Admission::Admitted => build.admitted.push(instrument),
            other => {
                debug!("{}: dropped from universe ({other})", instrument.symbol);
                build.rejected.push((instrument.symbol, other));
            }
        }
    }

    info!(
        "universe built: {} admitted, {} screened out, {} unavailable",
        build.admitted.len(),
        build.rejected.len(),
        build.unavailable.len()
    );
    Ok(build)
}

/// A position closed during a cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Liquidation {
    pub symbol: Symbol,
    pub reason: ExitReason,
    pub price_cents: i64,
    /// Buy price on record before the exit, if any.
    pub buy_price_cents: Option<i64>,
    pub change: f64,
}

/// Everything one cycle decided.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    pub selection: Selection,
    pub liquidations: Vec<Liquidation>,
    /// Target weights sent to the host, in order.
    pub targets: Vec<(Symbol, f64)>,
    /// Selected symbols held out of this cycle after a price exit.
    pub skipped: Vec<Symbol>,
}

impl CycleReport {
    /// Sum of all target weights sent this cycle.
    pub fn total_weight(&self) -> f64 {
        self.targets.iter().map(|(_, w)| w).sum()
    }

    pub fn target(&self, symbol: &Symbol) -> Option<f64> {
        self.targets
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|&(_, w)| w)
    }

    pub fn liquidated(&self, symbol: &Symbol) -> Option<ExitReason> {
        self.liquidations
            .iter()
            .find(|l| l.symbol == *symbol)
            .map(|l| l.reason)
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members: Vec<&str> = self.selection.members.iter().map(|s| s.as_str()).collect();
        writeln!(
            f,
            "Selected {} ({} eligible, {} backfilled): {}",
            self.selection.len(),
            self.selection.eligible,
            self.selection.backfilled,
            members.join(", ")
        )?;
        for l in &self.liquidations {
            writeln!(
                f,
                "  LIQUIDATE {:<8} {:>+7.2}%  ({})",
                l.symbol,
                l.change * 100.0,
                l.reason
            )?;
        }
        for (symbol, weight) in &self.targets {
            writeln!(f, "  TARGET    {symbol:<8} {:>6.2}%", weight * 100.0)?;
        }
        if !self.skipped.is_empty() {
            let skipped: Vec<&str> = self.skipped.iter().map(|s| s.as_str()).collect();
            writeln!(f, "  Held in cash this cycle: {}", skipped.join(", "))?;
        }
        write!(f, "  Total weight: {:.2}%", self.total_weight() * 100.0)
    }
}

/// Stateful strategy driver. Owns the universe and recorded buy prices;
/// the host is passed in on every call.
#[derive(Debug, Clone)]
pub struct Rebalancer {
    params: StrategyParams,
    universe: Vec<Symbol>,
    buy_prices: FxHashMap<Symbol, i64>,
}

impl Rebalancer {
    /// Validate `params`, build the universe from `tickers`, and return a
    /// rebalancer ready for its first cycle.
    pub fn initialize<H, S>(params: StrategyParams, tickers: &[S], host: &mut H) -> Result<Self>
    where
        H: Host,
        S: AsRef<str>,
    {
        params.validate()?;
        let build = build_universe(&params, tickers, host)?;
        Self::from_universe(params, build.symbols())
    }

    /// Create from an already-screened universe.
    pub fn from_universe(params: StrategyParams, universe: Vec<Symbol>) -> Result<Self> {
        params.validate()?;
        if universe.is_empty() {
            return Err(Error::EmptyUniverse);
        }
        Ok(Self {
            params,
            universe,
            buy_prices: FxHashMap::default(),
        })
    }

    pub fn params(&self) -> &StrategyParams {
        &self.params
    }

    pub fn universe(&self) -> &[Symbol] {
        &self.universe
    }

    /// Price recorded when `symbol` last received a target weight.
    pub fn buy_price(&self, symbol: &Symbol) -> Option<i64> {
        self.buy_prices.get(symbol).copied()
    }

    /// Monthly trigger, anchored on the first universe symbol's calendar.
    pub fn schedule(&self) -> MonthlyRule {
        MonthlyRule::new(self.universe[0])
    }

    /// Run one rebalance cycle against `host`.
    pub fn rebalance<H: Host>(&mut self, host: &mut H) -> Result<CycleReport> {
        let entries: Vec<_> = self
            .universe
            .iter()
            .map(|&symbol| (symbol, host.fundamentals(&symbol)))
            .collect();
        let selection = select(&entries, &self.params.rules, self.params.max_portfolio_size);
        debug!(
            "selection: {} members, {} eligible, {} backfilled",
            selection.len(),
            selection.eligible,
            selection.backfilled
        );

        let liquidations = self.exit_pass(host, &selection)?;

        let skipped: Vec<Symbol> = if self.params.reenter_same_cycle {
            Vec::new()
        } else {
            liquidations
                .iter()
                .filter(|l| l.reason.is_price_exit())
                .map(|l| l.symbol)
                .collect()
        };

        let mut targets = Vec::new();
        for (symbol, weight) in allocate(&self.params.benchmarks, &selection.members) {
            if skipped.contains(&symbol) {
                continue;
            }
            host.set_target_weight(symbol, weight)?;
            if !self.params.is_benchmark(&symbol) {
                let price = host.current_price(&symbol)?;
                self.buy_prices.insert(symbol, price);
            }
            targets.push((symbol, weight));
        }

        info!(
            "cycle complete: {} selected, {} liquidated, {} targets",
            selection.len(),
            liquidations.len(),
            targets.len()
        );
        Ok(CycleReport {
            selection,
            liquidations,
            targets,
            skipped,
        })
    }

    /// Liquidate invested, non-benchmark holdings that fail an exit rule.
    fn exit_pass<H: Host>(
        &mut self,
        host: &mut H,
        selection: &Selection,
    ) -> Result<Vec<Liquidation>> {
        let mut liquidations = Vec::new();
        for holding in host.holdings()? {
            if !holding.invested || self.params.is_benchmark(&holding.symbol) {
                continue;
            }
            let symbol = holding.symbol;
            let price_cents = host.current_price(&symbol)?;
            let buy_price_cents = self.buy_price(&symbol);
            let change = price_change(price_cents, buy_price_cents);

            let Some(reason) = self
                .params
                .exit
                .evaluate(selection.contains(&symbol), change)
            else {
                continue;
            };

            host.liquidate(symbol)?;
            self.buy_prices.remove(&symbol);
            info!("{symbol}: liquidated ({reason}, {:+.2}%)", change * 100.0);
            liquidations.push(Liquidation {
                symbol,
                reason,
                price_cents,
                buy_price_cents,
                change,
            });
        }
        Ok(liquidations)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::inconsistent_digit_grouping)]

    use super::*;
    use screenbook::{FundamentalsSnapshot, SectorCode};
    use screenbook_host::mock::MockHost;

    fn tech(roe: f64) -> FundamentalsSnapshot {
        FundamentalsSnapshot {
            roe,
            profit_margin: 0.25,
            price_to_book: 4.0,
            operating_margin: 0.30,
            gross_margin: 0.60,
            revenue_growth: 0.12,
            asset_turnover: 0.7,
            roa: 0.10,
            free_cash_flow: 1e9,
            cash_ratio: 1.0,
            market_cap: 50e9,
            sector: SectorCode::InformationTechnology,
        }
    }

    fn host() -> MockHost {
        MockHost::builder()
            .with_etf("IVV", 400_00)
            .with_etf("MOAT", 80_00)
            .with_stock("AAA", 100_00, tech(0.30))
            .with_stock("BBB", 50_00, tech(0.20))
            .with_instrument("GMAB", "dk")
            .with_fundamentals("GMAB", tech(0.40))
            .build()
    }

    #[test]
    fn universe_drops_foreign_and_unknown() {
        let mut host = host();
        let params = StrategyParams::default();
        let build =
            build_universe(&params, &["AAA", "GMAB", "BBB", "AAA", "ZZZ"], &mut host).unwrap();
        assert_eq!(build.symbols(), vec![Symbol::new("AAA"), Symbol::new("BBB")]);
        assert_eq!(build.rejected.len(), 1);
        assert_eq!(build.unavailable, vec!["ZZZ".to_string()]);
        assert!(host.is_registered(&Symbol::new("IVV")));
        assert!(host.is_registered(&Symbol::new("MOAT")));
    }

    #[test]
    fn benchmarks_stay_out_of_universe() {
        let mut host = host();
        let rb = Rebalancer::initialize(StrategyParams::default(), &["IVV", "AAA"], &mut host)
            .unwrap();
        assert_eq!(rb.universe(), &[Symbol::new("AAA")]);
    }

    #[test]
    fn empty_universe_is_an_error() {
        let mut host = host();
        assert!(matches!(
            Rebalancer::initialize(StrategyParams::default(), &["GMAB"], &mut host),
            Err(Error::EmptyUniverse)
        ));
    }

    #[test]
    fn schedule_anchors_on_first_symbol() {
        let mut host = host();
        let rb = Rebalancer::initialize(StrategyParams::default(), &["BBB", "AAA"], &mut host)
            .unwrap();
        assert_eq!(rb.schedule().anchor, Symbol::new("BBB"));
    }

    #[test]
    fn first_cycle_records_buy_prices() {
        let mut host = host();
        let mut rb = Rebalancer::initialize(StrategyParams::default(), &["AAA", "BBB"], &mut host)
            .unwrap();
        let report = rb.rebalance(&mut host).unwrap();
        assert!(report.liquidations.is_empty());
        assert_eq!(report.targets.len(), 4);
        assert!((report.total_weight() - 1.0).abs() < 1e-12);
        assert_eq!(rb.buy_price(&Symbol::new("AAA")), Some(100_00));
        assert_eq!(rb.buy_price(&Symbol::new("IVV")), None);
    }

    #[test]
    fn report_display() {
        let mut host = host();
        let mut rb =
            Rebalancer::initialize(StrategyParams::default(), &["AAA"], &mut host).unwrap();
        let text = rb.rebalance(&mut host).unwrap().to_string();
        assert!(text.starts_with("Selected 1 (1 eligible, 0 backfilled): AAA"));
        assert!(text.contains("TARGET    AAA       75.00%"));
        assert!(text.ends_with("Total weight: 100.00%"));
    }
}
